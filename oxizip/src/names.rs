//! Windows-safe entry names.
//!
//! Windows rejects `< > : " | ? *` in file names. [`NameSanitizer`] replaces
//! them with `_` and, when two different stored names end up identical, keeps
//! them apart by inserting a ` (n)` counter before the extension.

use std::collections::HashMap;

/// Characters that cannot appear in a Windows file name.
pub const FORBIDDEN_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

/// Rewrites entry names for one extraction run.
#[derive(Debug, Default)]
pub struct NameSanitizer {
    /// Names handed out so far, and whether each was rewritten.
    produced: HashMap<String, bool>,
}

impl NameSanitizer {
    /// Create a sanitizer with no names produced yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `name` contains a forbidden character.
    pub fn needs_sanitizing(name: &str) -> bool {
        name.contains(FORBIDDEN_CHARS)
    }

    /// Return the on-disk name for a stored entry name.
    ///
    /// Names without forbidden characters are returned unchanged unless they
    /// collide with an earlier rewritten name.
    pub fn sanitize(&mut self, name: &str) -> String {
        let rewritten = Self::needs_sanitizing(name);
        let candidate: String = name
            .chars()
            .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
            .collect();

        let collides = match self.produced.get(&candidate) {
            Some(previous_rewritten) => rewritten || *previous_rewritten,
            None => false,
        };
        let result = if collides {
            self.disambiguate(&candidate)
        } else {
            candidate
        };

        self.produced.insert(result.clone(), rewritten);
        result
    }

    fn disambiguate(&self, name: &str) -> String {
        let (body, trailing) = match name.strip_suffix('/') {
            Some(body) => (body, "/"),
            None => (name, ""),
        };
        let file_start = body.rfind('/').map_or(0, |i| i + 1);
        let extension_start = body[file_start..]
            .rfind('.')
            .filter(|&i| i > 0)
            .map_or(body.len(), |i| file_start + i);
        let (stem, extension) = body.split_at(extension_start);

        let mut counter = 1u32;
        loop {
            let candidate = format!("{stem} ({counter}){extension}{trailing}");
            if !self.produced.contains_key(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
