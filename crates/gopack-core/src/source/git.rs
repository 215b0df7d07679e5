//! Committed tree of a git repository.
//!
//! Talks to the `git` executable instead of reading the object database
//! directly. Listings come from `git ls-tree -r -z`, file content from a
//! single long-lived `git cat-file --batch` process.

use super::FileEntry;
use super::Listing;
use super::ModuleSource;
use crate::PackError;
use crate::PackagingOptions;
use crate::ProgressCallback;
use crate::Result;
use crate::archive::PackagedArchive;
use crate::driver::Driver;
use crate::module;
use crate::module::DECLARATION_FILE;
use clap::Parser;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::ChildStdin;
use std::process::ChildStdout;
use std::process::Command;
use std::process::Stdio;
use tracing::debug;

/// Flags accepted by the `git` driver.
#[derive(Debug, Parser)]
#[command(
    name = "git",
    bin_name = "gopack git",
    about = "package from git driver repository"
)]
pub struct GitArgs {
    /// Repository working directory
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Revision to package
    #[arg(short = 'r', long = "rev", value_name = "REV", default_value = "HEAD")]
    pub rev: String,

    /// Sub-tree of the revision holding the module
    #[arg(short = 't', long = "tree", value_name = "PATH")]
    pub tree: Option<String>,
}

/// Registry entry for the `git` driver.
#[must_use]
pub fn driver() -> Driver {
    Driver {
        name: "git",
        description: "package from git driver repository",
        entry: run,
    }
}

/// Entry point of the `git` driver.
///
/// # Errors
///
/// Returns [`PackError::DriverArgs`] for bad flags, and any error from
/// [`GitSource::open`] or [`super::package`].
pub fn run(
    options: PackagingOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<PackagedArchive> {
    let argv = std::iter::once("git".to_string()).chain(options.args.iter().cloned());
    let args = GitArgs::try_parse_from(argv)?;
    let mut source = GitSource::open(&args.dir, &args.rev, args.tree.as_deref())?;
    super::package(&mut source, &options, progress)
}

/// One revision of a git repository, optionally narrowed to a sub-tree.
///
/// The revision is resolved to a commit hash once, in [`open`](Self::open).
/// Everything read afterwards comes from that commit, so uncommitted
/// changes in the working directory never reach the archive.
#[derive(Debug)]
pub struct GitSource {
    repo: PathBuf,
    tree: Option<String>,
    commit: String,
    listing: Option<Listing<String>>,
    blobs: Option<BlobReader>,
}

impl GitSource {
    /// Opens `repo` at revision `rev`.
    ///
    /// `tree` selects a directory inside the revision; entry paths are then
    /// relative to it. Leading and trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// - [`PackError::SourceNotFound`] if `repo` is not a directory
    /// - [`PackError::RepositoryNotFound`] if `repo` has no `.git` entry
    /// - [`PackError::Revision`] if `rev` or `tree` cannot be resolved
    /// - [`PackError::Git`] if `git` cannot be run
    pub fn open(repo: impl AsRef<Path>, rev: &str, tree: Option<&str>) -> Result<Self> {
        let repo = repo.as_ref();
        if !repo.is_dir() {
            return Err(PackError::SourceNotFound {
                path: repo.to_path_buf(),
            });
        }
        if !repo.join(".git").exists() {
            return Err(PackError::RepositoryNotFound {
                path: repo.to_path_buf(),
            });
        }
        let repo = repo.canonicalize()?;

        if rev.is_empty() || rev.starts_with('-') {
            return Err(PackError::Revision {
                rev: rev.to_string(),
                reason: "not a revision expression".to_string(),
            });
        }

        let commit = resolve(&repo, rev, &format!("{rev}^{{commit}}"))?;
        let tree = tree
            .map(|t| t.trim_matches('/'))
            .filter(|t| !t.is_empty() && *t != ".")
            .map(str::to_string);
        if let Some(tree) = &tree {
            resolve(&repo, &format!("{rev}:{tree}"), &format!("{commit}:{tree}^{{tree}}"))?;
        }
        debug!(repo = %repo.display(), %rev, %commit, "resolved revision");

        Ok(Self {
            repo,
            tree,
            commit,
            listing: None,
            blobs: None,
        })
    }

    /// Full hash of the resolved commit.
    #[must_use]
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Sub-tree the source is narrowed to, if any.
    #[must_use]
    pub fn tree(&self) -> Option<&str> {
        self.tree.as_deref()
    }

    fn treeish(&self) -> String {
        match &self.tree {
            Some(tree) => format!("{}:{tree}", self.commit),
            None => self.commit.clone(),
        }
    }

    fn listing(&mut self) -> Result<&Listing<String>> {
        if self.listing.is_none() {
            let raw = run_git(&self.repo, &["ls-tree", "-r", "-z", &self.treeish()])?;
            let mut listing = parse_ls_tree(&raw)?;
            listing.sort();
            debug!(
                files = listing.entries.len(),
                skipped = listing.skipped.len(),
                "listed tree"
            );
            self.listing = Some(listing);
        }
        Ok(self.listing.get_or_insert_with(Listing::default))
    }

    fn read_blob(&mut self, oid: &str) -> Result<Vec<u8>> {
        if self.blobs.is_none() {
            self.blobs = Some(BlobReader::spawn(&self.repo)?);
        }
        match &mut self.blobs {
            Some(blobs) => blobs.read(oid),
            None => Err(PackError::git("cat-file", "blob reader unavailable")),
        }
    }
}

impl ModuleSource for GitSource {
    type Handle = String;

    fn describe(&self) -> String {
        format!(
            "git revision {} from \"{}>>{}\"",
            self.commit,
            self.repo.display(),
            self.tree.as_deref().unwrap_or_default()
        )
    }

    fn revision(&self) -> Option<&str> {
        Some(&self.commit)
    }

    fn module_name(&mut self) -> Result<String> {
        let declaration = self.tree.as_deref().map_or_else(
            || self.repo.join(DECLARATION_FILE),
            |tree| self.repo.join(tree).join(DECLARATION_FILE),
        );
        let oid = self
            .listing()?
            .entries
            .iter()
            .find(|entry| entry.path == DECLARATION_FILE)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| PackError::DeclarationNotFound {
                path: declaration.clone(),
            })?;

        let content = self.read_blob(&oid)?;
        module::parse_module_name(String::from_utf8_lossy(&content).lines(), &declaration)
    }

    fn files(&mut self) -> Result<Listing<String>> {
        Ok(self.listing()?.clone())
    }

    fn open(&mut self, entry: &FileEntry<String>) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.read_blob(&entry.handle)?)))
    }
}

/// Resolves `expr` with `rev-parse --verify`, reporting failures against
/// the user-facing expression `shown`.
fn resolve(repo: &Path, shown: &str, expr: &str) -> Result<String> {
    let output = git_command(repo)
        .args(["rev-parse", "--verify", "--quiet", "--end-of-options", expr])
        .output()
        .map_err(|e| PackError::git("rev-parse", e))?;
    if !output.status.success() {
        return Err(PackError::Revision {
            rev: shown.to_string(),
            reason: "unknown revision or path".to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn git_command(repo: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo);
    cmd
}

fn run_git(repo: &Path, args: &[&str]) -> Result<Vec<u8>> {
    let command = args.first().copied().unwrap_or_default();
    let output = git_command(repo)
        .args(args)
        .output()
        .map_err(|e| PackError::git(command, e))?;
    if !output.status.success() {
        return Err(PackError::git(
            command,
            String::from_utf8_lossy(&output.stderr).trim(),
        ));
    }
    Ok(output.stdout)
}

/// Parses `git ls-tree -r -z` output.
///
/// Records look like `<mode> <type> <oid>\t<path>` and are NUL-terminated.
/// Only plain and executable blobs are listed; symlinks and submodules end
/// up in `skipped`.
fn parse_ls_tree(raw: &[u8]) -> Result<Listing<String>> {
    let mut listing = Listing::default();

    for record in raw.split(|&b| b == 0).filter(|r| !r.is_empty()) {
        let text = std::str::from_utf8(record).map_err(|_| PackError::NonUtf8Path {
            path: PathBuf::from(String::from_utf8_lossy(record).into_owned()),
        })?;
        let (meta, path) = text
            .split_once('\t')
            .ok_or_else(|| PackError::git("ls-tree", format!("unexpected record: {text}")))?;
        let mut fields = meta.split(' ');
        let (Some(mode), Some(kind), Some(oid)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(PackError::git("ls-tree", format!("unexpected record: {text}")));
        };

        match (kind, mode) {
            ("blob", "100644" | "100664") => listing.entries.push(FileEntry {
                path: path.to_string(),
                mode: 0o644,
                handle: oid.to_string(),
            }),
            ("blob", "100755") => listing.entries.push(FileEntry {
                path: path.to_string(),
                mode: 0o755,
                handle: oid.to_string(),
            }),
            _ => listing.skipped.push(path.to_string()),
        }
    }

    Ok(listing)
}

/// Client for a `git cat-file --batch` child process.
#[derive(Debug)]
struct BlobReader {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl BlobReader {
    fn spawn(repo: &Path) -> Result<Self> {
        let mut child = git_command(repo)
            .args(["cat-file", "--batch"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PackError::git("cat-file", e))?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PackError::git("cat-file", "stdout not captured"))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    fn read(&mut self, oid: &str) -> Result<Vec<u8>> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| PackError::git("cat-file", "stdin closed"))?;
        writeln!(stdin, "{oid}")?;
        stdin.flush()?;

        let mut header = String::new();
        if self.stdout.read_line(&mut header)? == 0 {
            return Err(PackError::git("cat-file", "unexpected end of output"));
        }
        let header = header.trim_end();
        if header.ends_with(" missing") {
            return Err(PackError::git("cat-file", format!("object {oid} missing")));
        }

        let size = header
            .rsplit(' ')
            .next()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| PackError::git("cat-file", format!("bad header: {header}")))?;

        let mut content = vec![0u8; size];
        self.stdout.read_exact(&mut content)?;
        let mut newline = [0u8; 1];
        self.stdout.read_exact(&mut newline)?;

        Ok(content)
    }
}

impl Drop for BlobReader {
    fn drop(&mut self) {
        // Closing stdin ends the batch loop.
        drop(self.stdin.take());
        let _ = self.child.wait();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn git(repo: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(repo)
            .status()
            .unwrap();
        assert!(status.success(), "git command failed: {args:?}");
    }

    fn commit_all(repo: &Path, message: &str) {
        git(repo, &["add", "-A"]);
        git(repo, &["commit", "-q", "-m", message]);
    }

    fn fixture_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        let repo = temp.path();
        git(repo, &["init", "-q"]);
        git(repo, &["config", "user.email", "test@example.com"]);
        git(repo, &["config", "user.name", "Test User"]);
        git(repo, &["config", "commit.gpgsign", "false"]);

        fs::write(repo.join("go.mod"), "module example.com/bar\n").unwrap();
        fs::write(repo.join("main.go"), "package main\n").unwrap();
        fs::create_dir_all(repo.join("sub")).unwrap();
        fs::write(repo.join("sub/go.mod"), "module example.com/bar/sub\n").unwrap();
        fs::write(repo.join("sub/sub.go"), "package sub\n").unwrap();
        commit_all(repo, "initial");
        temp
    }

    fn paths(listing: &Listing<String>) -> Vec<&str> {
        listing.entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_parse_ls_tree_records() {
        let raw = b"100644 blob aaaa\tgo.mod\0\
                    100755 blob bbbb\trun.sh\0\
                    120000 blob cccc\tlink\0\
                    160000 commit dddd\tvendor/lib\0";
        let listing = parse_ls_tree(raw).unwrap();

        assert_eq!(paths(&listing), vec!["go.mod", "run.sh"]);
        assert_eq!(listing.entries[0].mode, 0o644);
        assert_eq!(listing.entries[1].mode, 0o755);
        assert_eq!(listing.entries[1].handle, "bbbb");
        assert_eq!(listing.skipped, vec!["link", "vendor/lib"]);
    }

    #[test]
    fn test_parse_ls_tree_rejects_garbage() {
        let err = parse_ls_tree(b"not a record\0").unwrap_err();
        assert!(matches!(err, PackError::Git { .. }));
    }

    #[test]
    fn test_parse_ls_tree_keeps_spaces_in_paths() {
        let listing = parse_ls_tree(b"100644 blob aaaa\tdocs/read me.txt\0").unwrap();
        assert_eq!(paths(&listing), vec!["docs/read me.txt"]);
    }

    #[test]
    fn test_open_not_a_repository() {
        let temp = TempDir::new().unwrap();
        let err = GitSource::open(temp.path(), "HEAD", None).unwrap_err();
        assert!(matches!(err, PackError::RepositoryNotFound { .. }));
    }

    #[test]
    fn test_open_missing_directory() {
        let err = GitSource::open("/nonexistent/gopack/repo", "HEAD", None).unwrap_err();
        assert!(matches!(err, PackError::SourceNotFound { .. }));
    }

    #[test]
    fn test_open_rejects_option_like_revision() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        let err = GitSource::open(temp.path(), "--all", None).unwrap_err();
        assert!(matches!(err, PackError::Revision { .. }));
    }

    #[test]
    fn test_open_unknown_revision() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        let err = GitSource::open(temp.path(), "no-such-branch", None).unwrap_err();
        match err {
            PackError::Revision { rev, .. } => assert_eq!(rev, "no-such-branch"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_unknown_tree() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        let err = GitSource::open(temp.path(), "HEAD", Some("missing")).unwrap_err();
        assert!(matches!(err, PackError::Revision { .. }));
    }

    #[test]
    fn test_head_listing_and_module() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        let mut source = GitSource::open(temp.path(), "HEAD", None).unwrap();

        assert_eq!(source.commit().len(), 40);
        assert_eq!(source.revision(), Some(source.commit()));
        assert_eq!(source.module_name().unwrap(), "example.com/bar");
        assert_eq!(
            paths(&source.files().unwrap()),
            vec!["go.mod", "main.go", "sub/go.mod", "sub/sub.go"]
        );
    }

    #[test]
    fn test_sub_tree_paths_are_relative() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        let mut source = GitSource::open(temp.path(), "HEAD", Some("/sub/")).unwrap();

        assert_eq!(source.tree(), Some("sub"));
        assert_eq!(source.module_name().unwrap(), "example.com/bar/sub");
        assert_eq!(paths(&source.files().unwrap()), vec!["go.mod", "sub.go"]);
        assert!(source.describe().ends_with(">>sub\""));
    }

    #[test]
    fn test_reads_committed_content_only() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        fs::write(temp.path().join("main.go"), "package changed\n").unwrap();
        fs::write(temp.path().join("untracked.go"), "package x\n").unwrap();

        let mut source = GitSource::open(temp.path(), "HEAD", None).unwrap();
        let listing = source.files().unwrap();
        assert!(!paths(&listing).contains(&"untracked.go"));

        let entry = listing.entries.iter().find(|e| e.path == "main.go").unwrap();
        let mut content = String::new();
        source.open(entry).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "package main\n");
    }

    #[test]
    fn test_older_revision() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        fs::write(temp.path().join("extra.go"), "package main\n").unwrap();
        commit_all(temp.path(), "second");

        let mut head = GitSource::open(temp.path(), "HEAD", None).unwrap();
        let mut prev = GitSource::open(temp.path(), "HEAD~1", None).unwrap();
        assert_ne!(head.commit(), prev.commit());
        assert!(paths(&head.files().unwrap()).contains(&"extra.go"));
        assert!(!paths(&prev.files().unwrap()).contains(&"extra.go"));
    }

    #[test]
    fn test_missing_declaration() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        git(temp.path(), &["rm", "-q", "go.mod"]);
        git(temp.path(), &["commit", "-q", "-m", "drop go.mod"]);

        let mut source = GitSource::open(temp.path(), "HEAD", None).unwrap();
        let err = source.module_name().unwrap_err();
        assert!(matches!(err, PackError::DeclarationNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_and_executables() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        std::os::unix::fs::symlink("main.go", temp.path().join("link.go")).unwrap();
        let script = temp.path().join("gen.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        }
        commit_all(temp.path(), "links");

        let mut source = GitSource::open(temp.path(), "HEAD", None).unwrap();
        let listing = source.files().unwrap();
        assert_eq!(listing.skipped, vec!["link.go"]);
        let script = listing.entries.iter().find(|e| e.path == "gen.sh").unwrap();
        assert_eq!(script.mode, 0o755);
    }

    #[test]
    fn test_run_with_pseudo_version() {
        if !git_available() {
            return;
        }
        let temp = fixture_repo();
        let options = PackagingOptions::new([
            "-d".to_string(),
            temp.path().display().to_string(),
            "-t".to_string(),
            "sub".to_string(),
        ])
        .with_version("v1.0.0")
        .with_pseudo_version(true);

        let archive = run(options, &mut crate::NoopProgress).unwrap();
        let report = archive.report();
        let commit = report.revision.clone().unwrap();
        assert_eq!(report.module, "example.com/bar/sub");
        assert!(report.version.starts_with("v1.0.0-"));
        assert!(report.version.ends_with(&commit[..12]));
        assert_eq!(report.files_added, 2);
    }
}
