//! Integration tests for the Token ID codec (C1): pair/id round-trips
//! and the concrete scenarios of spec §8.3.1.

use pairbond::token_id::{decode_pair, decode_token_id, encode_pair, encode_token_id, TokenId};
use proptest::prelude::*;

#[test]
fn concrete_pair_scenarios() {
    assert_eq!(encode_pair(0).unwrap(), "AA");
    assert_eq!(encode_pair(1).unwrap(), "AB");
    assert_eq!(encode_pair(49).unwrap(), "Az");
    assert_eq!(encode_pair(50).unwrap(), "BA");
    assert_eq!(encode_pair(2499).unwrap(), "zz");
    assert!(decode_pair("AO").is_err());
}

#[test]
fn encode_rejects_out_of_range_values() {
    assert!(encode_pair(2500).is_err());
    assert!(encode_pair(u32::MAX).is_err());
}

#[test]
fn token_id_depth_bounds() {
    assert!(decode_token_id("AA").is_ok());
    assert!(decode_token_id("AA.AA.AA.AA.AA").is_ok());
    assert!(decode_token_id("AA.AA.AA.AA.AA.AA").is_err());
    assert!(TokenId::new(&[]).is_err());
    assert!(TokenId::new(&[0, 0, 0, 0, 0, 0]).is_err());
}

#[test]
fn alphabet_sort_order_matches_token_ordering() {
    let ids: Vec<TokenId> = vec!["AA.AA", "AA.AB", "AB.AA", "zz.zz"]
        .into_iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(sorted, ids);
}

proptest! {
    #[test]
    fn pair_round_trips_over_full_domain(v in 0u32..2500) {
        let encoded = encode_pair(v).unwrap();
        prop_assert_eq!(decode_pair(&encoded).unwrap(), v);
    }

    #[test]
    fn token_id_round_trips_any_depth(
        v1 in 0u32..2500,
        v2 in 0u32..2500,
        v3 in 0u32..2500,
        v4 in 0u32..2500,
        v5 in 0u32..2500,
    ) {
        for values in [
            vec![v1],
            vec![v1, v2],
            vec![v1, v2, v3],
            vec![v1, v2, v3, v4],
            vec![v1, v2, v3, v4, v5],
        ] {
            let encoded = encode_token_id(&values).unwrap();
            let decoded = decode_token_id(&encoded).unwrap();
            prop_assert_eq!(decoded, values.clone());
            prop_assert_eq!(encode_token_id(&decoded).unwrap(), encoded);
        }
    }

    #[test]
    fn decode_never_accepts_the_letter_o(v in 0u32..2500) {
        let encoded = encode_pair(v).unwrap();
        // Corrupt the pair by substituting its first character with 'O'.
        let corrupted = format!("O{}", &encoded[1..]);
        prop_assert!(decode_pair(&corrupted).is_err());
    }
}
