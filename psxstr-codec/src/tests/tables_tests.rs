use super::*;

fn is_prefix(code_a: u16, len_a: u8, code_b: u16, len_b: u8) -> bool {
    len_a < len_b && code_a == code_b >> (len_b - len_a)
}

fn assert_prefix_free(codes: &[(u16, u8)]) {
    for (i, &(ca, la)) in codes.iter().enumerate() {
        for &(cb, lb) in &codes[i + 1..] {
            assert!(
                !is_prefix(ca, la, cb, lb) && !is_prefix(cb, lb, ca, la),
                "{ca:#b}/{la} and {cb:#b}/{lb} overlap"
            );
            assert!(ca != cb || la != lb, "duplicate code {ca:#b}/{la}");
        }
    }
}

#[test]
fn test_dc_tables_cover_every_size_category() {
    for table in [DC_LUMA, DC_CHROMA] {
        assert_eq!(table.len(), 9);
        for size in 0..=8u8 {
            assert_eq!(
                table.iter().filter(|e| e.size == size).count(),
                1,
                "size category {size}"
            );
        }
    }
    assert!(DC_LUMA.iter().all(|e| e.len <= DC_LUMA_MAX_LEN));
    assert!(DC_CHROMA.iter().all(|e| e.len <= DC_CHROMA_MAX_LEN));
}

#[test]
fn test_dc_tables_prefix_free_and_longest_first() {
    for table in [DC_LUMA, DC_CHROMA] {
        assert_prefix_free(
            &table
                .iter()
                .map(|e| (e.code as u16, e.len))
                .collect::<Vec<_>>(),
        );
        // The decoder matches in table order, so longer prefixes must come
        // first.
        assert!(table.windows(2).all(|w| w[0].len >= w[1].len));
    }
}

#[test]
fn test_ac_table_prefix_free_with_control_codes() {
    let mut codes: Vec<(u16, u8)> = AC_TABLE.iter().map(|e| (e.code, e.len)).collect();
    codes.push((AC_END_OF_BLOCK_CODE, AC_END_OF_BLOCK_LEN));
    codes.push((AC_ESCAPE_CODE, AC_ESCAPE_LEN));
    assert_prefix_free(&codes);
}

#[test]
fn test_ac_table_entries_well_formed() {
    for entry in AC_TABLE {
        assert!(entry.len <= AC_MAX_LEN);
        assert!(entry.level > 0, "level must carry a sign bit separately");
        assert!(entry.run <= 63);
        assert!(entry.code >> entry.len == 0, "code wider than its length");
    }
    // Ordered by length so the encoder finds the shortest code first.
    assert!(AC_TABLE.windows(2).all(|w| w[0].len <= w[1].len));
}

#[test]
fn test_ac_table_run_level_pairs_unique() {
    for (i, a) in AC_TABLE.iter().enumerate() {
        for b in &AC_TABLE[i + 1..] {
            assert!(
                a.run != b.run || a.level != b.level,
                "duplicate pair ({}, {})",
                a.run,
                a.level
            );
        }
    }
}
