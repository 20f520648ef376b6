use super::*;

fn free_ranges<T>(allocator: &RangeAllocator<T>) -> Vec<(u32, u32)> {
    allocator.free_ranges().map(|range| (range.index, range.count)).collect()
}

// ============================================================================
// Construction tests
// ============================================================================

#[test]
fn test_new_has_single_free_range() {
    let allocator = RangeAllocator::<u32>::new(64).unwrap();
    assert_eq!(allocator.number_of_elements(), 64);
    assert_eq!(allocator.underlying_data().len(), 64);
    assert_eq!(free_ranges(&allocator), vec![(0, 64)]);
}

#[test]
fn test_new_rejects_zero_elements() {
    assert!(RangeAllocator::<u32>::new(0).is_err());
}

#[test]
fn test_size_accessors() {
    let allocator = RangeAllocator::<[f32; 4]>::new(10).unwrap();
    assert_eq!(RangeAllocator::<[f32; 4]>::SIZE_OF_ELEMENT, 16);
    assert_eq!(allocator.size_of_underlying_data(), 160);
    assert_eq!(allocator.size_of_section(Section::new(2, 3)), 48);
    assert!(allocator.element_type_name().contains("f32"));
}

// ============================================================================
// Allocation tests
// ============================================================================

#[test]
fn test_allocate_zero_is_noop() {
    let mut allocator = RangeAllocator::<u8>::new(8).unwrap();
    let before = free_ranges(&allocator);

    assert_eq!(allocator.allocate(0), Section::EMPTY);
    assert_eq!(allocator.allocate(0), Section { index: 0, count: 0 });
    assert_eq!(free_ranges(&allocator), before);
    assert_eq!(allocator.number_of_elements(), 8);
}

#[test]
fn test_allocate_then_deallocate_round_trip() {
    let mut allocator = RangeAllocator::<u16>::new(32).unwrap();
    let before = free_ranges(&allocator);

    let section = allocator.allocate(5);
    assert_eq!(section, Section::new(0, 5));
    allocator.deallocate(section);

    assert_eq!(free_ranges(&allocator), before);
}

#[test]
fn test_sections_do_not_overlap() {
    let mut allocator = RangeAllocator::<u32>::new(100).unwrap();
    let a = allocator.allocate(10);
    let b = allocator.allocate(20);
    let c = allocator.allocate(30);

    assert_eq!(a, Section::new(0, 10));
    assert_eq!(b, Section::new(10, 20));
    assert_eq!(c, Section::new(30, 30));
    assert_eq!(allocator.free_count(), 40);
}

#[test]
fn test_freed_hole_is_reused_first_fit() {
    let mut allocator = RangeAllocator::<u32>::new(16).unwrap();
    let a = allocator.allocate(4);
    let _b = allocator.allocate(4);
    allocator.deallocate(a);

    assert_eq!(allocator.allocate(3), Section::new(0, 3));
    assert_eq!(allocator.allocate(2), Section::new(8, 2));
}

// ============================================================================
// Growth tests
// ============================================================================

#[test]
fn test_growth_preserves_existing_data() {
    let mut allocator = RangeAllocator::<u32>::new(4).unwrap();
    let first = allocator.allocate(4);
    allocator.section_data_mut(first).copy_from_slice(&[11, 22, 33, 44]);

    let second = allocator.allocate(1);

    assert_eq!(second, Section::new(4, 1));
    assert_eq!(allocator.number_of_elements(), 8);
    assert_eq!(allocator.section_data(first), &[11, 22, 33, 44]);
    assert_eq!(&allocator.underlying_data()[..4], &[11, 22, 33, 44]);
    assert_eq!(free_ranges(&allocator), vec![(5, 3)]);
}

#[test]
fn test_growth_extends_trailing_free_range() {
    let mut allocator = RangeAllocator::<u8>::new(8).unwrap();
    let _a = allocator.allocate(6);
    // [6, 8) free; 4 does not fit so the store doubles and [6, 16) is free
    let b = allocator.allocate(4);

    assert_eq!(b, Section::new(6, 4));
    assert_eq!(allocator.number_of_elements(), 16);
    assert_eq!(free_ranges(&allocator), vec![(10, 6)]);
}

#[test]
fn test_growth_repeats_until_request_fits() {
    let mut allocator = RangeAllocator::<u8>::new(2).unwrap();
    let section = allocator.allocate(20);

    assert_eq!(section, Section::new(0, 20));
    assert_eq!(allocator.number_of_elements(), 32);
    assert_eq!(allocator.size_of_underlying_data(), 32);
    assert_eq!(free_ranges(&allocator), vec![(20, 12)]);
}

#[test]
fn test_growth_keeps_interior_holes() {
    let mut allocator = RangeAllocator::<u8>::new(8).unwrap();
    let a = allocator.allocate(2);
    let _b = allocator.allocate(6);
    allocator.deallocate(a);

    let c = allocator.allocate(4);
    assert_eq!(c, Section::new(8, 4));
    assert_eq!(free_ranges(&allocator), vec![(0, 2), (12, 4)]);
}

#[test]
fn test_growth_fills_new_elements_with_default() {
    let mut allocator = RangeAllocator::<i64>::new(2).unwrap();
    let a = allocator.allocate(2);
    allocator.section_data_mut(a).fill(-1);
    let b = allocator.allocate(2);

    assert_eq!(allocator.section_data(b), &[0, 0]);
}

#[test]
fn test_growth_clamps_at_top_of_index_space() {
    // Zero-sized elements: the backing array costs no memory
    let mut allocator = RangeAllocator::<()>::new(0x8000_0001).unwrap();
    allocator.allocate(0x8000_0001);

    // Doubling would overflow u32, so the store grows to exactly u32::MAX
    let section = allocator.allocate(1);
    assert_eq!(section, Section::new(0x8000_0001, 1));
    assert_eq!(allocator.number_of_elements(), u32::MAX);
    assert_eq!(allocator.underlying_data().len(), u32::MAX as usize);
    assert_eq!(free_ranges(&allocator), vec![(0x8000_0002, 0x7FFF_FFFD)]);
}

#[test]
#[should_panic(expected = "already spans the u32 index space")]
fn test_growth_past_index_space_is_fatal() {
    let mut allocator = RangeAllocator::<()>::new(0x8000_0001).unwrap();
    allocator.allocate(0x8000_0001);
    allocator.allocate(1);
    // 0x7FFF_FFFD indices are left, one short
    allocator.allocate(0x7FFF_FFFE);
}

// ============================================================================
// Raw byte access
// ============================================================================

#[test]
fn test_underlying_bytes_matches_elements() {
    let mut allocator = RangeAllocator::<u32>::new(2).unwrap();
    let section = allocator.allocate(1);
    allocator.section_data_mut(section)[0] = 0x0102_0304;

    let bytes = allocator.underlying_bytes();
    assert_eq!(bytes.len(), 8);
    assert_eq!(&bytes[..4], &0x0102_0304u32.to_ne_bytes());
    assert_eq!(allocator.section_bytes(section), &0x0102_0304u32.to_ne_bytes());
}

// ============================================================================
// Misuse tests
// ============================================================================

#[test]
#[should_panic(expected = "double free")]
fn test_double_free_panics() {
    let mut allocator = RangeAllocator::<u32>::new(8).unwrap();
    let section = allocator.allocate(3);
    allocator.deallocate(section);
    allocator.deallocate(section);
}

#[test]
#[should_panic(expected = "outside the tracked capacity")]
fn test_foreign_section_panics() {
    let mut allocator = RangeAllocator::<u32>::new(8).unwrap();
    allocator.deallocate(Section::new(100, 4));
}
