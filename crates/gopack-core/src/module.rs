//! Module identity resolution from `go.mod`.

use crate::PackError;
use crate::Result;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// File name of the module declaration at the root of a source tree.
pub const DECLARATION_FILE: &str = "go.mod";

const MODULE_KEYWORD: &str = "module";

/// Extracts the module path from the lines of a declaration file.
///
/// The first line whose trimmed text is the `module` keyword followed by
/// whitespace wins. A trailing `//` comment and surrounding double quotes
/// are stripped from the identifier.
///
/// `source` only labels the error.
///
/// # Errors
///
/// Returns [`PackError::MalformedDeclaration`] if no line declares a
/// non-empty module path.
///
/// # Examples
///
/// ```
/// use gopack_core::module::parse_module_name;
/// use std::path::Path;
///
/// let text = "// tool\nmodule example.com/foo\n\ngo 1.22\n";
/// let name = parse_module_name(text.lines(), Path::new("go.mod"))?;
/// assert_eq!(name, "example.com/foo");
/// # Ok::<(), gopack_core::PackError>(())
/// ```
pub fn parse_module_name<'a, I>(lines: I, source: &Path) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .find_map(module_directive)
        .ok_or_else(|| PackError::MalformedDeclaration {
            path: source.to_path_buf(),
        })
}

fn module_directive(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(MODULE_KEYWORD)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.split_once("//").map_or(rest, |(before, _)| before).trim();
    let name = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(rest);
    (!name.is_empty()).then(|| name.to_string())
}

/// Reads `<dir>/go.mod` and returns the declared module path.
///
/// # Errors
///
/// Returns [`PackError::DeclarationNotFound`] when the file is missing,
/// [`PackError::MalformedDeclaration`] when it has no `module` line, and
/// [`PackError::Io`] for other read failures.
pub fn read_module_name(dir: &Path) -> Result<String> {
    let path = dir.join(DECLARATION_FILE);
    let text = read_declaration(&path)?;
    parse_module_name(text.lines(), &path)
}

fn read_declaration(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PackError::DeclarationNotFound {
            path: PathBuf::from(path),
        },
        _ => PackError::Io(e),
    })
}
