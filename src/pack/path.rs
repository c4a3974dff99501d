#![forbid(unsafe_code)]

use std::path::Path;

use crate::pack::error::{PackError, PackResult};

/// Path of `file_path` below `input_root`, joined with `/`.
pub fn normalize_rel_path(input_root: &Path, file_path: &Path) -> PackResult<String> {
    let rel = file_path.strip_prefix(input_root).map_err(|_| {
        PackError::Invalid(format!(
            "{} is outside {}",
            file_path.display(),
            input_root.display()
        ))
    })?;

    let mut out = String::new();
    for (i, comp) in rel.components().enumerate() {
        if i != 0 {
            out.push('/');
        }
        out.push_str(&comp.as_os_str().to_string_lossy());
    }
    Ok(entry_name(&out))
}

/// Final component of `path`, or an empty string for roots like `/`.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn prefixed(prefix: &str, rel: &str) -> String {
    if prefix.is_empty() {
        return rel.to_string();
    }
    if rel.is_empty() {
        return prefix.to_string();
    }
    let p = prefix.trim_end_matches('/');
    let r = rel.trim_start_matches('/');
    format!("{p}/{r}")
}

/// Archive names always use `/` and never start with one.
pub fn entry_name(raw: &str) -> String {
    raw.replace('\\', "/").trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = PathBuf::from("/srv/www");
        let file = root.join("css").join("site.css");
        assert_eq!(normalize_rel_path(&root, &file).unwrap(), "css/site.css");
    }

    #[test]
    fn outside_root_is_invalid() {
        let err = normalize_rel_path(Path::new("/srv/www"), Path::new("/etc/passwd")).unwrap_err();
        assert!(matches!(err, PackError::Invalid(_)));
    }

    #[test]
    fn base_name_of_root_is_empty() {
        assert_eq!(base_name(Path::new("/srv/www")), "www");
        assert_eq!(base_name(Path::new("/")), "");
    }

    #[test]
    fn prefixing() {
        assert_eq!(prefixed("www", "css/site.css"), "www/css/site.css");
        assert_eq!(prefixed("", "css/site.css"), "css/site.css");
        assert_eq!(prefixed("www/", "/a"), "www/a");
        assert_eq!(prefixed("www", ""), "www");
    }

    #[test]
    fn entry_names_are_normalized() {
        assert_eq!(entry_name("a\\b\\c.txt"), "a/b/c.txt");
        assert_eq!(entry_name("/abs/x"), "abs/x");
    }
}
