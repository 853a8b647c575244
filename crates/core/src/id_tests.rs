// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
    assert_eq!(short("abcdefgh", 8), "abcdefgh");
}

#[test]
fn vm_name_from_uuid_is_hyphenated() {
    let uuid = uuid::Uuid::parse_str("97b45daf-53d1-48ad-b992-547469d8e438").unwrap();
    let name = VmName::from(uuid);
    assert_eq!(name, "97b45daf-53d1-48ad-b992-547469d8e438");
    assert_eq!(name.short(8), "97b45daf");
}

#[test]
fn vm_name_serializes_transparently() {
    let name = VmName::new("vm-1");
    assert_eq!(serde_json::to_string(&name).unwrap(), r#""vm-1""#);
}
