// src/ident.rs
use crate::error::InvalidPathError;

/// スラッシュ区切りのパスを PascalCase の識別子に変換する
///
/// 空セグメントは捨て、各セグメントの先頭文字だけを大文字にして連結する。
/// 例: `/settings/user` → `SettingsUser`
pub fn derive_identifier(component_path: &str) -> Result<String, InvalidPathError> {
    let ident: String = component_path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(upper_first)
        .collect();

    if ident.is_empty() {
        return Err(InvalidPathError {
            path: component_path.to_string(),
            reason: "空のパスからは識別子を作れません",
        });
    }
    Ok(ident)
}

/// import で束縛する識別子を作る
///
/// `derive_identifier` の結果が JavaScript の識別子にならない場合 (`/404` → `404`、
/// `/user-list` → `User-list` など) はエラー。そのまま書き込むとルート定義が壊れる。
pub fn derive_binding(component_path: &str) -> Result<String, InvalidPathError> {
    let ident = derive_identifier(component_path)?;
    if !is_identifier(&ident) {
        return Err(InvalidPathError {
            path: component_path.to_string(),
            reason: "JavaScript の識別子にならないパスです (英数字・`_`・`$` のみ、先頭は数字以外)",
        });
    }
    Ok(ident)
}

/// JavaScript の識別子として書けるか
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// 先頭文字だけを大文字にする (残りはそのまま)
pub fn upper_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_pascal_case_from_segments() {
        assert_eq!(derive_identifier("/settings/user").unwrap(), "SettingsUser");
        assert_eq!(derive_identifier("/kanban").unwrap(), "Kanban");
        assert_eq!(derive_identifier("users/list").unwrap(), "UsersList");
    }

    #[test]
    fn keeps_inner_casing_and_skips_empty_segments() {
        assert_eq!(derive_identifier("//userCenter///detail/").unwrap(), "UserCenterDetail");
        assert_eq!(derive_identifier("/Login").unwrap(), "Login");
    }

    #[test]
    fn bindings_must_be_identifiers() {
        assert_eq!(derive_binding("/setting/user").unwrap(), "SettingUser");
        assert_eq!(derive_binding("/用户/列表").unwrap(), "用户列表");
        assert_eq!(derive_binding("/$admin/_draft").unwrap(), "$admin_draft");

        let err = derive_binding("/404").unwrap_err();
        assert_eq!(err.path, "/404");
        assert!(derive_binding("/user-list").is_err());
        assert!(derive_binding("/users/list.page").is_err());
        assert!(derive_binding("/a b").is_err());
    }

    #[test]
    fn rejects_empty_or_blank_paths() {
        assert!(derive_identifier("").is_err());
        assert!(derive_identifier("   ").is_err());
        assert!(derive_identifier("///").is_err());
    }
}
