//! Property tests: any byte value written through a store reads back unchanged.

use kvctl::{CodecKind, Driver, resolve};
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_store_roundtrip(
        key in prop::collection::vec(any::<u8>(), 1..64),
        value in prop::collection::vec(any::<u8>(), 0..4096),
    ) {
        let dir = TempDir::new().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let store = resolve(Driver::Fjall, &dir.path().join("db"), "bucket", CodecKind::None)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        store.set(&key, &value).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let read = store.get(&key).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(read, Some(value));
    }
}

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use std::io::Cursor;

    use kvctl::cli::{Cli, Ui};

    fn invoke(args: Vec<std::ffi::OsString>, stdin: Vec<u8>) -> (i32, Vec<u8>) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let ui = Ui::new(Cursor::new(stdin), &mut stdout, &mut stderr);
        let code = Cli::new(ui).without_env().run(args);
        (code, stdout)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_put_stdin_get_roundtrip(value in prop::collection::vec(any::<u8>(), 0..2048)) {
            let dir = TempDir::new().map_err(|e| TestCaseError::fail(e.to_string()))?;
            let location = dir.path().join("store.db").into_os_string();

            let (code, out) = invoke(vec!["put".into(), location.clone(), "k".into()], value.clone());
            prop_assert_eq!(code, 0);
            prop_assert!(out.is_empty());

            let (code, out) = invoke(vec!["get".into(), location, "k".into()], Vec::new());
            prop_assert_eq!(code, 0);
            prop_assert_eq!(out, value);
        }
    }
}
