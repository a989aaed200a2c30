// DynArray growth and contraction properties.
//
// Property 1: after n pushes from capacity c0 with expand rate g,
//   capacity == c0 + g * ceil(max(0, n - c0) / g) and len == n.
// Property 2: popping everything back out returns the pushed values in
//   reverse and never shrinks capacity below g + 1 once it was above it.
// Property 3: out-of-range get/set/remove leave the array unchanged.
use darray_hashmap::{ArrayError, DynArray};
use proptest::prelude::*;

fn expected_capacity(c0: usize, g: usize, n: usize) -> usize {
    c0 + g * n.saturating_sub(c0).div_ceil(g)
}

proptest! {
    #[test]
    fn prop_growth_bound(c0 in 1usize..64, g in 1usize..32, n in 0usize..600) {
        let mut a: DynArray<usize> = DynArray::with_expand_rate(8, c0, g).unwrap();
        for i in 0..n {
            a.push(i).unwrap();
        }
        prop_assert_eq!(a.len(), n);
        prop_assert_eq!(a.capacity(), expected_capacity(c0, g, n));
    }

    #[test]
    fn prop_pop_reverses_and_respects_floor(c0 in 1usize..64, g in 1usize..32, n in 1usize..600) {
        let mut a: DynArray<usize> = DynArray::with_expand_rate(8, c0, g).unwrap();
        for i in 0..n {
            a.push(i).unwrap();
        }
        let floor = a.capacity().min(g + 1);
        for i in (0..n).rev() {
            prop_assert_eq!(a.pop(), Ok(Some(i)));
            prop_assert!(a.capacity() >= floor);
            prop_assert!(a.capacity() > a.len());
        }
        prop_assert_eq!(a.pop(), Err(ArrayError::EmptyArray));
    }

    #[test]
    fn prop_out_of_range_is_rejected(c0 in 1usize..64, extra in 0usize..64) {
        let mut a: DynArray<u8> = DynArray::init(1, c0).unwrap();
        let index = c0 + extra;
        let err = ArrayError::IndexOutOfRange { index, capacity: c0 };
        prop_assert_eq!(a.get(index), Err(err));
        prop_assert_eq!(a.set(index, 1), Err(err));
        prop_assert_eq!(a.remove(index), Err(err));
        prop_assert_eq!(a.len(), 0);
        prop_assert_eq!(a.capacity(), c0);
    }
}
