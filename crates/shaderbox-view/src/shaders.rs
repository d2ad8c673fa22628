use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub const BUNDLED_VERTEX: &str = include_str!("../shaders/fullscreen.vert");
pub const BUNDLED_FRAGMENT: &str = include_str!("../shaders/plasma.frag");

/// GLSL dialect matching the context the window surface created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslFlavor {
    /// OpenGL 3.3 core.
    Desktop,
    /// OpenGL ES 3.0.
    Embedded,
}

impl GlslFlavor {
    pub fn header(self) -> &'static str {
        match self {
            GlslFlavor::Desktop => "#version 330 core\n",
            GlslFlavor::Embedded => "#version 300 es\nprecision highp float;\n",
        }
    }

    /// Prepends the version header unless the source declares its own.
    pub fn prepare(self, source: &str) -> String {
        if source.trim_start().starts_with("#version") {
            return source.to_string();
        }
        let mut prepared = String::with_capacity(self.header().len() + source.len());
        prepared.push_str(self.header());
        prepared.push_str(source);
        prepared
    }
}

/// Reads `path`, or falls back to the bundled source.
pub fn load(path: Option<&Path>, bundled: &'static str) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read shader {}", path.display())),
        None => Ok(bundled.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_prepended_once() {
        let prepared = GlslFlavor::Desktop.prepare(BUNDLED_FRAGMENT);
        assert!(prepared.starts_with("#version 330 core\n"));
        assert!(prepared.ends_with(BUNDLED_FRAGMENT));

        let explicit = "#version 300 es\nvoid main() {}\n";
        assert_eq!(GlslFlavor::Desktop.prepare(explicit), explicit);
    }

    #[test]
    fn embedded_header_sets_precision() {
        let prepared = GlslFlavor::Embedded.prepare(BUNDLED_VERTEX);
        assert!(prepared.starts_with("#version 300 es\nprecision highp float;\n"));
    }

    #[test]
    fn bundled_fragment_uses_resolution_and_time() {
        assert!(BUNDLED_FRAGMENT.contains("uniform vec2 iResolution;"));
        assert!(BUNDLED_FRAGMENT.contains("uniform float iTime;"));
        assert!(!BUNDLED_FRAGMENT.contains("#version"));
    }

    #[test]
    fn load_reads_files_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.frag");
        fs::write(&path, "void main() {}\n").unwrap();
        assert_eq!(load(Some(&path), BUNDLED_FRAGMENT).unwrap(), "void main() {}\n");
        assert_eq!(load(None, BUNDLED_VERTEX).unwrap(), BUNDLED_VERTEX);
        assert!(load(Some(&dir.path().join("missing.frag")), BUNDLED_FRAGMENT).is_err());
    }
}
