//! Storage-key mapping.
//!
//! Source documents live under `{source_prefix}/{site}/{library}/{path}`;
//! their twins live under the extracted prefix with a `.json` extension.
//! Components are sanitized so arbitrary document names always produce
//! valid store keys.

/// Object-store key length limit in bytes
pub const MAX_KEY_BYTES: usize = 1024;

/// Bidirectional mapper between content-store paths and storage keys
#[derive(Debug, Clone)]
pub struct KeyMapper {
    source_prefix: String,
    extracted_prefix: String,
}

impl KeyMapper {
    pub fn new(source_prefix: impl Into<String>, extracted_prefix: impl Into<String>) -> Self {
        Self {
            source_prefix: source_prefix.into(),
            extracted_prefix: extracted_prefix.into(),
        }
    }

    /// Build a sanitized source key from content-store coordinates.
    ///
    /// Example: site `"Acme"`, library `"HR Policies"`, path
    /// `"/2025/Employee Handbook.docx"` becomes
    /// `source/Acme/HR-Policies/2025/Employee-Handbook.docx`.
    pub fn source_key(&self, site: &str, library: &str, relative_path: &str) -> String {
        let site_part = sanitize_component(site);
        let lib_part = sanitize_component(library);
        let path_part = sanitize_path(relative_path);

        let mut segments = vec![self.source_prefix.as_str(), &site_part, &lib_part];
        if !path_part.is_empty() {
            segments.push(&path_part);
        }

        truncate_key(segments.join("/"))
    }

    /// Derive the twin storage key for a source key: swap the source prefix
    /// for the extracted prefix and replace the extension with `.json`
    /// (appending it when the file has none).
    pub fn extracted_key(&self, source_key: &str) -> String {
        let relative = source_key
            .strip_prefix(&format!("{}/", self.source_prefix))
            .unwrap_or(source_key);

        let (dir, file) = match relative.rsplit_once('/') {
            Some((dir, file)) => (Some(dir), file),
            None => (None, relative),
        };

        // A leading dot alone does not count as an extension
        let stem = match file.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => file,
        };

        let renamed = format!("{stem}.json");
        match dir {
            Some(dir) => format!("{}/{}/{}", self.extracted_prefix, dir, renamed),
            None => format!("{}/{}", self.extracted_prefix, renamed),
        }
    }
}

/// Sanitize a single path component (file or folder name): spaces become
/// hyphens, characters outside `[\w.-]` are stripped, hyphen runs collapse.
fn sanitize_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut prev_hyphen = false;

    for ch in component.chars() {
        let ch = if ch == ' ' { '-' } else { ch };
        if !(ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == '-') {
            continue;
        }
        if ch == '-' {
            if prev_hyphen {
                continue;
            }
            prev_hyphen = true;
        } else {
            prev_hyphen = false;
        }
        out.push(ch);
    }

    out
}

/// Sanitize a full relative path, preserving `/` separators
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(sanitize_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Clip a key to the store's byte limit on a character boundary
fn truncate_key(key: String) -> String {
    if key.len() <= MAX_KEY_BYTES {
        return key;
    }
    let mut end = MAX_KEY_BYTES;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    key[..end].to_string()
}
