use crate::error::Result;

/// Allocates a vector of `len` copies of `value`, reporting allocation
/// failure as [`SccError::OutOfMemory`](crate::error::SccError::OutOfMemory)
/// instead of aborting.
pub(crate) fn try_filled_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)?;
    vec.resize(len, value);
    Ok(vec)
}

/// Allocates an empty vector able to hold `capacity` elements without
/// reallocating.
pub(crate) fn try_vec_with_capacity<T>(capacity: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(capacity)?;
    Ok(vec)
}

/// Pushes onto `vec`, growing it fallibly.
pub(crate) fn try_push<T>(vec: &mut Vec<T>, value: T) -> Result<()> {
    if vec.len() == vec.capacity() {
        vec.try_reserve(1)?;
    }
    vec.push(value);
    Ok(())
}

#[cfg(test)]
mod test_util {
    use super::*;
    use crate::error::SccError;

    #[test]
    fn test_filled_vec() {
        let vec = try_filled_vec(4, u32::MAX).unwrap();
        assert_eq!(vec, vec![u32::MAX; 4]);
        assert!(try_filled_vec::<u8>(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_capacity_overflow_is_out_of_memory() {
        let err = try_vec_with_capacity::<u64>(usize::MAX).unwrap_err();
        assert_eq!(err, SccError::OutOfMemory);
    }

    #[test]
    fn test_push_grows() {
        let mut vec = try_vec_with_capacity(1).unwrap();
        for i in 0..10 {
            try_push(&mut vec, i).unwrap();
        }
        assert_eq!(vec.len(), 10);
    }
}
