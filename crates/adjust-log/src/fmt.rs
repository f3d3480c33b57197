use compact_str::CompactString;

use termcolor::ColorSpec;

/// Layout of a single log line, a sequence of fixed text and message segments.
#[derive(Default, Clone, Debug)]
pub struct LogFmt {
    segments: Vec<SegmentSpec>,
}

impl LogFmt {

    /// The layout used before any format is configured: just the message.
    pub fn message_only() -> Self {
        Self {
            segments: vec![SegmentSpec::Message(LogSpec::default())],
        }
    }

    /// A `[label] message` layout with the label colored.
    pub fn labeled(label: &str, color_spec: ColorSpec) -> Self {
        Self {
            segments: vec![
                SegmentSpec::Text(CompactString::new("["), LogSpec::default()),
                SegmentSpec::Text(CompactString::new(label), LogSpec { color_spec: Some(color_spec) }),
                SegmentSpec::Text(CompactString::new("] "), LogSpec::default()),
                SegmentSpec::Message(LogSpec::default()),
            ],
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn clear(&mut self) {
        self.segments.clear();
    }
}

impl<'a> IntoIterator for &'a LogFmt {

    type Item = &'a SegmentSpec;
    type IntoIter = core::slice::Iter<'a, SegmentSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[derive(Default, Clone, Debug)]
pub struct LogSpec {
    pub color_spec: Option<ColorSpec>,
}

impl LogSpec {

    #[inline(always)]
    pub fn with_color_spec(mut self, mut f: impl FnMut(&mut ColorSpec)) -> Self {
        let color_spec = self.color_spec.insert(ColorSpec::new());
        f(color_spec);
        self
    }
}

#[derive(Clone, Debug)]
pub enum SegmentSpec {
    Message(LogSpec),
    Text(CompactString, LogSpec),
}

/// Rebuilds a [`LogFmt`] in place. Creating the builder clears the format.
pub struct LogFmtBuilder<'a> {
    fmt: &'a mut LogFmt,
}

impl<'a> LogFmtBuilder<'a> {

    #[inline(always)]
    pub fn new(fmt: &'a mut LogFmt) -> Self {
        fmt.clear();
        Self {
            fmt,
        }
    }

    #[inline(always)]
    pub fn message(&mut self, mut f: impl FnMut(LogSpec) -> LogSpec) -> &mut Self {
        self.fmt.segments.push(SegmentSpec::Message(f(Default::default())));
        self
    }

    #[inline(always)]
    pub fn text(&mut self, text: &str, mut f: impl FnMut(LogSpec) -> LogSpec) -> &mut Self {
        self.fmt.segments.push(SegmentSpec::Text(CompactString::new(text), f(Default::default())));
        self
    }
}
