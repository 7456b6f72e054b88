// ==========================================
// WWPN 归一化属性测试
// ==========================================
// 测试目标: 任意书写形式归一化后一致、幂等；非 16 位输入一律拒绝
// ==========================================

use proptest::prelude::*;
use san_import::importer::wwpn::{self, WwpnPrefixTable};

/// 16 位十六进制（大小写混合）
fn hex16() -> impl Strategy<Value = String> {
    "[0-9a-fA-F]{16}"
}

/// 8 组字节，以冒号 / 短横线 / 空格 / 无分隔连接
fn formatted(hex: &str, sep: &str) -> String {
    let chars: Vec<char> = hex.chars().collect();
    chars
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(sep)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_normalize_ignores_separators_and_case(
        hex in hex16(),
        sep in prop_oneof![Just(":"), Just("-"), Just(" "), Just("")],
    ) {
        let canonical = wwpn::normalize(&hex).unwrap();
        let variant = wwpn::normalize(&formatted(&hex, sep)).unwrap();

        prop_assert_eq!(&canonical, &variant);
        prop_assert_eq!(canonical.len(), 23);
        prop_assert_eq!(canonical.clone(), canonical.to_lowercase());
    }

    #[test]
    fn test_normalize_is_idempotent(hex in hex16()) {
        let once = wwpn::normalize(&hex).unwrap();
        let twice = wwpn::normalize(&once).unwrap();

        prop_assert_eq!(&once, &twice);
        prop_assert!(wwpn::looks_like_wwpn(&once));
        prop_assert!(wwpn::is_valid(&once));
    }

    #[test]
    fn test_wrong_digit_count_is_rejected(
        text in "[0-9a-f]{0,31}".prop_filter("16 位为有效长度", |t| t.len() != 16),
    ) {
        prop_assert!(wwpn::normalize(&text).is_err());
        prop_assert!(!wwpn::is_valid(&text));
        prop_assert!(wwpn::classify(&text, &WwpnPrefixTable::with_defaults()).is_none());
    }

    #[test]
    fn test_classification_does_not_depend_on_format(hex in hex16()) {
        let table = WwpnPrefixTable::with_defaults();
        let plain = wwpn::classify(&hex, &table);
        let colon = wwpn::classify(&formatted(&hex, ":"), &table);

        prop_assert_eq!(plain, colon);
    }
}
