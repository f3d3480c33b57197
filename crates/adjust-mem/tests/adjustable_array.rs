use pretty_assertions::assert_eq;

use adjust_mem::{GlobalArray, Misuse, Misuses};

const NO_ERROR: &str = "No error.\n";

const CLAMPED: &str = "Nonpositive size passed into constructor, so\n\
    the capacity was set to 1 by default.\n";

const BAD_INDEX: &str = "Invalid index was used\n";

const BAD_RESIZE: &str = "Nonpositive new size passed into change_size, so\n\
    the size of the array was not changed.\n";

fn from_values(values: &[i64]) -> GlobalArray<i64> {
    let mut array = GlobalArray::new(values.len() as isize).unwrap();
    for (i, &value) in values.iter().enumerate() {
        *array.checked_mut(i as isize) = value;
    }
    assert!(array.misuses().is_empty());
    array
}

fn values(array: &GlobalArray<i64>) -> Vec<i64> {
    (0..array.len() as isize).map(|i| *array.checked(i)).collect()
}

#[test]
fn valid_sizes_start_clean() {
    for size in [1, 2, 7, 64, 1000] {
        let array = GlobalArray::<i64>::new(size).unwrap();
        assert_eq!(array.len(), size as usize);
        assert_eq!(array.error_message(), NO_ERROR);
        assert!(values(&array).iter().all(|&v| v == 0));
    }
}

#[test]
fn nonpositive_sizes_clamp_to_one() {
    for size in [0, -1, -50, isize::MIN] {
        let array = GlobalArray::<i64>::new(size).unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array.error_message(), CLAMPED);
        assert_eq!(array.misuses(), Misuses::from(Misuse::NonPositiveSize));
    }
}

#[test]
fn copies_are_independent() {
    let mut a = from_values(&[1, 2, 3]);
    let mut b = a.clone();
    *a.checked_mut(0) = 100;
    assert_eq!(values(&b), vec![1, 2, 3]);
    *b.checked_mut(2) = -3;
    assert_eq!(values(&a), vec![100, 2, 3]);
}

#[test]
fn copy_carries_register() {
    let mut a = GlobalArray::<String>::new(-2).unwrap();
    a.change_size(0).unwrap();
    let b = a.try_clone().unwrap();
    assert_eq!(b.misuses(), a.misuses());
    assert_eq!(b.error_message(), format!("{}{}", CLAMPED, BAD_RESIZE));
}

#[test]
fn assign_replaces_everything() {
    let source = GlobalArray::<i64>::new(0).unwrap();
    let mut target = from_values(&[9, 8, 7, 6]);
    target.assign(&source).unwrap();
    assert_eq!(target.len(), 1);
    assert_eq!(target.error_message(), CLAMPED);
    assert_eq!(values(&target), vec![0]);
}

#[test]
fn assign_resets_register_from_clean_source() {
    let source = from_values(&[5, 6]);
    let mut target = GlobalArray::<i64>::new(-1).unwrap();
    target.change_size(-1).unwrap();
    target.assign(&source).unwrap();
    assert_eq!(target.error_message(), NO_ERROR);
    assert_eq!(values(&target), vec![5, 6]);
}

#[test]
fn assign_chains() {
    let a = from_values(&[1, 2]);
    let b = from_values(&[3]);
    let mut c = from_values(&[4, 5, 6]);
    c.assign(&a).unwrap().assign(&b).unwrap();
    assert_eq!(values(&c), vec![3]);
}

#[test]
fn assigning_own_copy_is_stable() {
    let mut a = from_values(&[1, 2, 3]);
    a.change_size(0).unwrap();
    let before = a.misuses();
    let copy = a.clone();
    a.clone_from(&copy);
    a.assign(&copy).unwrap();
    assert_eq!(values(&a), vec![1, 2, 3]);
    assert_eq!(a.misuses(), before);
}

#[test]
fn shrink_keeps_leading_elements() {
    let mut array = from_values(&[1, 2, 3, 4, 5]);
    array.change_size(3).unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(values(&array), vec![1, 2, 3]);
}

#[test]
fn grow_keeps_elements_and_pads() {
    let mut array = from_values(&[1, 2, 3]);
    array.change_size(5).unwrap();
    assert_eq!(array.len(), 5);
    assert_eq!(values(&array), vec![1, 2, 3, 0, 0]);
    assert_eq!(array.error_message(), NO_ERROR);
}

#[test]
fn nonpositive_resize_changes_nothing() {
    for new_size in [0, -1, -1000] {
        let mut array = from_values(&[10, 20, 30]);
        array.change_size(new_size).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(values(&array), vec![10, 20, 30]);
        assert_eq!(array.misuses(), Misuses::from(Misuse::NonPositiveResize));
        assert_eq!(array.error_message(), BAD_RESIZE);
    }
}

#[test]
fn out_of_range_returns_sentinel() {
    let mut array = from_values(&[1, 2, 3]);
    assert_eq!(*array.checked(-1), 0);
    assert_eq!(*array.checked(3), 0);
    *array.checked_mut(3) = 42;
    assert_eq!(values(&array), vec![1, 2, 3]);
    assert_eq!(*array.checked(1), 2);
    assert_eq!(array.error_message(), BAD_INDEX);
}

#[test]
fn flags_accumulate_in_order() {
    let mut array = GlobalArray::<i64>::new(0).unwrap();
    array.change_size(-4).unwrap();
    assert_eq!(array.error_message(), format!("{}{}", CLAMPED, BAD_RESIZE));
    let _ = array.checked(1);
    assert_eq!(array.error_message(), format!("{}{}{}", CLAMPED, BAD_INDEX, BAD_RESIZE));
    assert_eq!(array.misuses().code(), 7);
    array.change_size(4).unwrap();
    assert_eq!(array.len(), 4);
    assert_eq!(array.misuses().code(), 7);
}

#[cfg(feature = "bounds-check")]
#[test]
fn index_operator_uses_sentinel() {
    let mut array = from_values(&[1, 2]);
    array[2] = 5;
    assert_eq!(array[0], 1);
    assert_eq!(array[7], 0);
    assert_eq!(array.misuses(), Misuses::from(Misuse::InvalidIndex));
}
