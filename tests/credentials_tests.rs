use blobstage::auth::{AccountKind, StorageAccountCredentials};
use blobstage::StageError;
use std::collections::HashMap;

fn vars(kind: AccountKind, name: &str, key: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(kind.name_var(), name.to_string());
    map.insert(kind.key_var(), key.to_string());
    map
}

#[cfg(test)]
mod resolution_tests {
    use super::*;

    #[test]
    fn test_non_empty_pairs_resolve_exactly() {
        let cases = [
            ("a", "k"),
            ("benchaccount01", "ZmFrZS1rZXk="),
            ("x", "key with spaces"),
        ];

        for kind in [AccountKind::Default, AccountKind::Secondary] {
            for (name, key) in cases {
                let env = vars(kind, name, key);
                let creds = StorageAccountCredentials::resolve(kind, &env).unwrap();
                assert_eq!(creds.name(), name);
                assert_eq!(creds.key(), key);
                assert_eq!(creds.kind(), kind);
            }
        }
    }

    #[test]
    fn test_empty_values_name_the_right_variable() {
        for kind in [AccountKind::Default, AccountKind::Secondary] {
            let cases = [
                ("", "key", vec![kind.name_var()]),
                ("name", "", vec![kind.key_var()]),
                ("", "", vec![kind.name_var(), kind.key_var()]),
            ];

            for (name, key, expected) in cases {
                let env = vars(kind, name, key);
                match StorageAccountCredentials::resolve(kind, &env) {
                    Err(StageError::MissingCredentials { variables }) => {
                        assert_eq!(variables, expected)
                    }
                    other => panic!("expected missing credentials, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_unset_secondary_reports_prefixed_names() {
        let env = vars(AccountKind::Default, "benchdefault", "a2V5");
        let err = StorageAccountCredentials::resolve(AccountKind::Secondary, &env).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("SECONDARY_AZURE_STORAGE_ACCOUNT_NAME"));
        assert!(message.contains("SECONDARY_AZURE_STORAGE_ACCOUNT_KEY"));
    }
}
