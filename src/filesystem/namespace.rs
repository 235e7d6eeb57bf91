use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, ensure};
use tracing::{debug, error, info, warn};

use super::error::{
    AlreadyExistsSnafu, AtRootSnafu, IoFailureSnafu, NamespaceError, NotADirectorySnafu,
    NotAFileSnafu, NotFoundSnafu, PathNotFoundSnafu, TargetNotFoundSnafu, UntrackedEntriesSnafu,
};
use super::node::{NodeId, NodeKind};
use super::path::{Segment, VirtualPath, target_segments};
use super::tree::{NodeTree, validate_name};
use crate::ext::absolutize;

pub const ROOT_NAME: &str = "root";

/// The namespace tree manager.
///
/// Owns the node arena, the cursor and the base directory the tree is mirrored
/// onto. Every mutation performs the real filesystem step first and only then
/// touches the arena, so a failed disk operation leaves both trees as they were.
#[derive(Debug)]
pub struct Namespace {
    pub(super) tree: NodeTree,
    pub(super) cursor: NodeId,
    base_path: PathBuf,
}

impl Namespace {
    /// Opens a namespace over `base_path`, adopting whatever is already on disk.
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self, NamespaceError> {
        let mut namespace = Self::open_empty(base_path)?;
        namespace.tree = scan_directory(&namespace.base_path, ROOT_NAME)?;
        namespace.cursor = namespace.tree.root();
        info!(
            "Adopted {} existing entries from {}",
            namespace.tree.len() - 1,
            namespace.base_path.display()
        );
        Ok(namespace)
    }

    /// Opens a namespace over `base_path` with an empty root, ignoring what is
    /// already on disk.
    pub fn open_empty(base_path: impl AsRef<Path>) -> Result<Self, NamespaceError> {
        let requested = base_path.as_ref();
        let base_path = absolutize(requested).context(IoFailureSnafu { path: requested })?;
        fs::create_dir_all(&base_path).context(IoFailureSnafu { path: &base_path })?;
        debug!("Mirroring namespace onto {}", base_path.display());

        let tree = NodeTree::new(ROOT_NAME);
        Ok(Namespace {
            cursor: tree.root(),
            tree,
            base_path,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Virtual path of the cursor, e.g. `root/src/app`.
    pub fn cursor_path(&self) -> String {
        self.virtual_path(self.cursor)
    }

    pub fn virtual_path(&self, id: NodeId) -> String {
        let root = self.tree.node(self.tree.root()).name();
        std::iter::once(root)
            .chain(self.tree.path_names(id))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Real location of `id`, derived from its current ancestors.
    pub fn real_path(&self, id: NodeId) -> PathBuf {
        let mut path = self.base_path.clone();
        path.extend(self.tree.path_names(id));
        path
    }

    /// Real location of a file in the current directory.
    pub fn file_real_path(&self, name: &str) -> Result<PathBuf, NamespaceError> {
        let file = self.file_child(name)?;
        Ok(self.real_path(file))
    }

    pub fn create_directory(&mut self, name: &str) -> Result<NodeId, NamespaceError> {
        self.ensure_vacant(name)?;
        let real_path = self.real_path(self.cursor).join(name);
        create_real_dir(&real_path)?;

        let id = self.tree.insert(self.cursor, name, NodeKind::directory())?;
        debug!(
            "Created directory {} at {}",
            self.virtual_path(id),
            real_path.display()
        );
        Ok(id)
    }

    /// Creates an empty file. An existing real file at that location is
    /// truncated.
    pub fn create_file(&mut self, name: &str) -> Result<NodeId, NamespaceError> {
        self.ensure_vacant(name)?;
        let real_path = self.real_path(self.cursor).join(name);
        fs::File::create(&real_path).context(IoFailureSnafu { path: &real_path })?;

        let id = self.tree.insert(self.cursor, name, NodeKind::file(""))?;
        debug!(
            "Created file {} at {}",
            self.virtual_path(id),
            real_path.display()
        );
        Ok(id)
    }

    pub fn list(&self) -> Vec<String> {
        self.tree.child_names(self.cursor)
    }

    /// Moves the cursor. Nothing changes unless every segment resolves.
    pub fn change_directory(&mut self, path: &str) -> Result<(), NamespaceError> {
        let target = self.resolve_directory(path)?;
        self.cursor = target;
        debug!("Changed directory to {}", self.cursor_path());
        Ok(())
    }

    fn resolve_directory(&self, path: &str) -> Result<NodeId, NamespaceError> {
        let parsed = VirtualPath::parse(path);
        let start = if parsed.is_absolute() {
            self.tree.root()
        } else {
            self.cursor
        };

        parsed
            .segments()
            .iter()
            .try_fold(start, |current, segment| match segment {
                Segment::Parent => self.tree.node(current).parent().context(AtRootSnafu),
                Segment::Name(name) => {
                    let child = self
                        .tree
                        .child(current, name)
                        .context(PathNotFoundSnafu { path })?;
                    ensure!(
                        self.tree.node(child).is_directory(),
                        NotADirectorySnafu { name: *name }
                    );
                    Ok(child)
                }
            })
    }

    /// Moves a file of the current directory into `target_dir`, which is
    /// always resolved downwards from the cursor. Returns the target directory.
    pub fn move_file(
        &mut self,
        file_name: &str,
        target_dir: &str,
    ) -> Result<NodeId, NamespaceError> {
        let file = self.file_child(file_name)?;
        let target = target_segments(target_dir)
            .try_fold(self.cursor, |current, part| {
                self.tree
                    .child(current, part)
                    .filter(|child| self.tree.node(*child).is_directory())
            })
            .context(TargetNotFoundSnafu { path: target_dir })?;
        ensure!(
            self.tree.child(target, file_name).is_none(),
            AlreadyExistsSnafu { name: file_name }
        );

        let from = self.real_path(file);
        let to = self.real_path(target).join(file_name);
        ensure!(
            !real_entry_exists(&to)?,
            AlreadyExistsSnafu { name: file_name }
        );
        fs::rename(&from, &to).context(IoFailureSnafu { path: &from })?;

        if let Err(err) = self.tree.move_node(file, target) {
            warn!("Reverting rename of {} after relink failed", from.display());
            self.undo_rename(&to, &from);
            return Err(err);
        }

        debug!(
            "Moved {} from {} to {}",
            file_name,
            from.display(),
            to.display()
        );
        Ok(target)
    }

    /// Deletes a child of the current directory. Directories go recursively.
    /// Returns the number of nodes removed.
    pub fn delete(&mut self, name: &str) -> Result<usize, NamespaceError> {
        let id = self
            .tree
            .child(self.cursor, name)
            .context(NotFoundSnafu { name })?;
        let real_path = self.real_path(id);

        if self.tree.node(id).is_directory() {
            self.remove_real_directory(&real_path, name)?;
        } else {
            remove_real_file(&real_path)?;
        }

        let removed = self.tree.remove(id);
        debug!("Deleted {} ({} nodes)", real_path.display(), removed);
        Ok(removed)
    }

    /// Renames the directory aside before removing it, so a failed removal can
    /// be put back in one step.
    fn remove_real_directory(&mut self, real_path: &Path, name: &str) -> Result<(), NamespaceError> {
        let staging = self.staging_path(real_path, name)?;
        match fs::rename(real_path, &staging) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("{} was already gone from disk", real_path.display());
                return Ok(());
            }
            Err(err) => return Err(err).context(IoFailureSnafu { path: real_path }),
        }

        if let Err(err) = fs::remove_dir_all(&staging) {
            warn!("Restoring {} after failed removal", real_path.display());
            self.undo_rename(&staging, real_path);
            return Err(err).context(IoFailureSnafu { path: real_path });
        }
        Ok(())
    }

    /// A sibling of `real_path` that is taken neither in the tree nor on disk.
    fn staging_path(&self, real_path: &Path, name: &str) -> Result<PathBuf, NamespaceError> {
        let prefix = format!(".{name}.deleting-{}", std::process::id());
        let mut attempt = 0usize;
        loop {
            let candidate = match attempt {
                0 => prefix.clone(),
                n => format!("{prefix}-{n}"),
            };
            let path = real_path.with_file_name(&candidate);
            if self.tree.child(self.cursor, &candidate).is_none() && !real_entry_exists(&path)? {
                return Ok(path);
            }
            attempt += 1;
        }
    }

    /// Renames `current` back to `original`. When that fails too, the tree is
    /// rebuilt from disk so it describes what is really there.
    fn undo_rename(&mut self, current: &Path, original: &Path) {
        if let Err(err) = fs::rename(current, original) {
            error!(
                "Could not move {} back to {}: {err}",
                current.display(),
                original.display()
            );
            self.resync_from_disk();
        }
    }

    /// Rebuilds the tree from the base directory. The cursor keeps its virtual
    /// path when that path still exists and falls back to root otherwise.
    pub fn reload_from_disk(&mut self) -> Result<(), NamespaceError> {
        let cursor_names: Vec<String> = self
            .tree
            .path_names(self.cursor)
            .into_iter()
            .map(str::to_owned)
            .collect();
        let root_name = self.tree.node(self.tree.root()).name().to_owned();
        let tree = scan_directory(&self.base_path, &root_name)?;

        self.cursor = tree
            .find(&cursor_names)
            .filter(|id| tree.node(*id).is_directory())
            .unwrap_or(tree.root());
        self.tree = tree;
        info!(
            "Reloaded {} entries from {}",
            self.tree.len() - 1,
            self.base_path.display()
        );
        Ok(())
    }

    fn resync_from_disk(&mut self) {
        if let Err(err) = self.reload_from_disk() {
            error!("Namespace could not be resynchronised from disk: {err}");
        }
    }

    /// Swaps in a freshly built tree after creating the real entries it needs.
    /// Existing real files are kept as they are. Refuses, without touching
    /// either tree, when the base directory holds entries the new tree lacks or
    /// has with another type.
    pub(crate) fn install_tree(&mut self, tree: NodeTree) -> Result<(), NamespaceError> {
        let on_disk = scan_directory(&self.base_path, tree.node(tree.root()).name())?;
        let untracked = untracked_entries(&on_disk, &tree);
        ensure!(
            untracked.is_empty(),
            UntrackedEntriesSnafu {
                paths: untracked.join(", ")
            }
        );

        if let Err(err) = materialize(&tree, &self.base_path) {
            warn!("Materialising the new tree failed, resynchronising from disk");
            self.resync_from_disk();
            return Err(err);
        }
        self.cursor = tree.root();
        self.tree = tree;
        Ok(())
    }

    fn file_child(&self, name: &str) -> Result<NodeId, NamespaceError> {
        let id = self
            .tree
            .child(self.cursor, name)
            .context(NotFoundSnafu { name })?;
        ensure!(self.tree.node(id).is_file(), NotAFileSnafu { name });
        Ok(id)
    }

    pub(super) fn ensure_vacant(&self, name: &str) -> Result<(), NamespaceError> {
        validate_name(name)?;
        ensure!(
            self.tree.child(self.cursor, name).is_none(),
            AlreadyExistsSnafu { name }
        );
        Ok(())
    }
}

fn create_real_dir(path: &Path) -> Result<(), NamespaceError> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(err) => Err(err).context(IoFailureSnafu { path }),
    }
}

fn remove_real_file(path: &Path) -> Result<(), NamespaceError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("{} was already gone from disk", path.display());
            Ok(())
        }
        Err(err) => Err(err).context(IoFailureSnafu { path }),
    }
}

fn real_entry_exists(path: &Path) -> Result<bool, NamespaceError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).context(IoFailureSnafu { path }),
    }
}

/// Paths in `on_disk` that `tree` has no entry of the same type for. Below an
/// untracked directory nothing more is reported.
fn untracked_entries(on_disk: &NodeTree, tree: &NodeTree) -> Vec<String> {
    let mut untracked = Vec::new();
    let mut pending = vec![(on_disk.root(), tree.root())];

    while let Some((disk_dir, tree_dir)) = pending.pop() {
        for (name, &disk_child) in on_disk.node(disk_dir).children().into_iter().flatten() {
            let is_directory = on_disk.node(disk_child).is_directory();
            match tree.child(tree_dir, name) {
                Some(tree_child) if tree.node(tree_child).is_directory() == is_directory => {
                    if is_directory {
                        pending.push((disk_child, tree_child));
                    }
                }
                _ => untracked.push(on_disk.path_names(disk_child).join("/")),
            }
        }
    }

    untracked.sort();
    untracked
}

fn scan_directory(base_path: &Path, root_name: &str) -> Result<NodeTree, NamespaceError> {
    let mut tree = NodeTree::new(root_name);
    let mut pending = vec![(tree.root(), base_path.to_path_buf())];

    while let Some((dir, real_dir)) = pending.pop() {
        let mut entries = fs::read_dir(&real_dir)
            .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
            .context(IoFailureSnafu { path: &real_dir })?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let real_path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!("Skipping {}: name is not valid UTF-8", real_path.display());
                continue;
            };
            let file_type = entry
                .file_type()
                .context(IoFailureSnafu { path: &real_path })?;

            let kind = if file_type.is_dir() {
                NodeKind::directory()
            } else if file_type.is_file() {
                NodeKind::file("")
            } else {
                warn!(
                    "Skipping {}: neither a regular file nor a directory",
                    real_path.display()
                );
                continue;
            };

            match tree.insert(dir, &name, kind) {
                Ok(id) if file_type.is_dir() => pending.push((id, real_path)),
                Ok(_) => {}
                Err(err) => warn!("Skipping {}: {err}", real_path.display()),
            }
        }
    }

    Ok(tree)
}

fn materialize(tree: &NodeTree, base_path: &Path) -> Result<(), NamespaceError> {
    for id in tree.descendants(tree.root()) {
        let mut real_path = base_path.to_path_buf();
        real_path.extend(tree.path_names(id));
        let node = tree.node(id);

        match node.content() {
            None => create_real_dir(&real_path)?,
            Some(_) if real_path.is_file() => {}
            Some(_) if real_path.exists() => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a directory occupies the location of a file",
                ))
                .context(IoFailureSnafu { path: real_path });
            }
            Some(content) => {
                fs::write(&real_path, content).context(IoFailureSnafu { path: &real_path })?
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn namespace() -> (TempDir, Namespace) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let namespace =
            Namespace::open(temp_dir.path().join("vfs")).expect("Failed to open namespace");
        (temp_dir, namespace)
    }

    #[test]
    fn open_creates_base_directory() {
        let (temp_dir, namespace) = namespace();
        assert!(temp_dir.path().join("vfs").is_dir());
        assert_eq!(namespace.base_path(), temp_dir.path().join("vfs"));
        assert_eq!(namespace.cursor_path(), "root");
        assert!(namespace.list().is_empty());
    }

    #[test]
    fn open_fails_when_base_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let result = Namespace::open(&blocker);
        assert!(matches!(result, Err(NamespaceError::IoFailure { .. })));
    }

    #[test]
    fn open_adopts_existing_entries_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("vfs");
        fs::create_dir_all(base.join("src/app")).unwrap();
        fs::write(base.join("b.txt"), "kept").unwrap();
        fs::write(base.join("src/app/main.rs"), "").unwrap();

        let mut namespace = Namespace::open(&base).unwrap();
        assert_eq!(namespace.list(), vec!["b.txt", "src"]);
        namespace.change_directory("src/app").unwrap();
        assert_eq!(namespace.list(), vec!["main.rs"]);
        assert_eq!(fs::read_to_string(base.join("b.txt")).unwrap(), "kept");
    }

    #[test]
    fn open_empty_ignores_existing_entries() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("vfs");
        fs::create_dir_all(base.join("old")).unwrap();
        let namespace = Namespace::open_empty(&base).unwrap();
        assert!(namespace.list().is_empty());
    }

    #[test]
    fn list_returns_names_in_creation_order() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("zeta").unwrap();
        namespace.create_file("alpha.txt").unwrap();
        namespace.create_directory("mid").unwrap();
        assert_eq!(namespace.list(), vec!["zeta", "alpha.txt", "mid"]);
    }

    #[test]
    fn create_mirrors_onto_disk() {
        let (_temp_dir, mut namespace) = namespace();
        let dir = namespace.create_directory("src").unwrap();
        namespace.change_directory("src").unwrap();
        let file = namespace.create_file("main.py").unwrap();

        let base = namespace.base_path().to_path_buf();
        assert_eq!(namespace.real_path(dir), base.join("src"));
        assert_eq!(namespace.real_path(file), base.join("src").join("main.py"));
        assert!(base.join("src").is_dir());
        assert!(base.join("src/main.py").is_file());
        assert_eq!(fs::metadata(base.join("src/main.py")).unwrap().len(), 0);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn colliding_create_changes_nothing(#[case] collide_with_directory: bool) {
        let (_temp_dir, mut namespace) = namespace();
        if collide_with_directory {
            namespace.create_directory("taken").unwrap();
        } else {
            namespace.create_file("taken").unwrap();
        }
        let nodes_before = namespace.tree().len();

        assert!(matches!(
            namespace.create_directory("taken"),
            Err(NamespaceError::AlreadyExists { .. })
        ));
        assert!(matches!(
            namespace.create_file("taken"),
            Err(NamespaceError::AlreadyExists { .. })
        ));
        assert_eq!(namespace.tree().len(), nodes_before);
        assert_eq!(namespace.list(), vec!["taken"]);
        assert_eq!(
            namespace.base_path().join("taken").is_dir(),
            collide_with_directory
        );
    }

    #[test]
    fn create_rejects_names_with_separators() {
        let (_temp_dir, mut namespace) = namespace();
        assert!(matches!(
            namespace.create_file("a/file"),
            Err(NamespaceError::InvalidName { .. })
        ));
        assert!(namespace.list().is_empty());
    }

    #[test]
    fn create_directory_reuses_existing_real_directory() {
        let (_temp_dir, mut namespace) = namespace();
        fs::create_dir(namespace.base_path().join("stray")).unwrap();
        namespace.create_directory("stray").unwrap();
        assert_eq!(namespace.list(), vec!["stray"]);
    }

    #[test]
    fn create_directory_over_real_file_leaves_tree_untouched() {
        let (_temp_dir, mut namespace) = namespace();
        fs::write(namespace.base_path().join("clash"), "data").unwrap();
        let result = namespace.create_directory("clash");
        assert!(matches!(result, Err(NamespaceError::IoFailure { .. })));
        assert!(namespace.list().is_empty());
    }

    #[test]
    fn create_file_over_real_directory_leaves_tree_untouched() {
        let (_temp_dir, mut namespace) = namespace();
        fs::create_dir(namespace.base_path().join("clash")).unwrap();
        let result = namespace.create_file("clash");
        assert!(matches!(result, Err(NamespaceError::IoFailure { .. })));
        assert!(namespace.list().is_empty());
    }

    #[test]
    fn create_file_truncates_existing_real_file() {
        let (_temp_dir, mut namespace) = namespace();
        let real = namespace.base_path().join("notes.txt");
        fs::write(&real, "old content").unwrap();
        namespace.create_file("notes.txt").unwrap();
        assert_eq!(fs::read_to_string(real).unwrap(), "");
    }

    #[test]
    fn change_directory_handles_absolute_relative_and_parent() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("a").unwrap();
        namespace.change_directory("a").unwrap();
        namespace.create_directory("b").unwrap();
        namespace.change_directory("b").unwrap();
        assert_eq!(namespace.cursor_path(), "root/a/b");

        namespace.change_directory("..").unwrap();
        assert_eq!(namespace.cursor_path(), "root/a");
        namespace.change_directory("/").unwrap();
        assert_eq!(namespace.cursor_path(), "root");
        namespace.change_directory("/a/b").unwrap();
        assert_eq!(namespace.cursor_path(), "root/a/b");
        namespace.change_directory("../../a").unwrap();
        assert_eq!(namespace.cursor_path(), "root/a");
    }

    #[test]
    fn repeated_parent_reaches_root_then_fails() {
        let (_temp_dir, mut namespace) = namespace();
        for name in ["a", "b", "c"] {
            namespace.create_directory(name).unwrap();
            namespace.change_directory(name).unwrap();
        }
        for _ in 0..3 {
            namespace.change_directory("..").unwrap();
        }
        assert_eq!(namespace.cursor(), namespace.tree().root());
        assert!(matches!(
            namespace.change_directory(".."),
            Err(NamespaceError::AtRoot)
        ));
        assert_eq!(namespace.cursor(), namespace.tree().root());
    }

    #[rstest]
    #[case("a/missing", "PathNotFound")]
    #[case("a/file.txt", "NotADirectory")]
    #[case("a/../..", "AtRoot")]
    #[case("/a/file.txt/x", "NotADirectory")]
    fn failed_change_directory_keeps_cursor(#[case] path: &str, #[case] expected: &str) {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("a").unwrap();
        namespace.change_directory("a").unwrap();
        namespace.create_file("file.txt").unwrap();
        namespace.change_directory("/").unwrap();

        let err = namespace.change_directory(path).unwrap_err();
        let kind = match err {
            NamespaceError::PathNotFound { .. } => "PathNotFound",
            NamespaceError::NotADirectory { .. } => "NotADirectory",
            NamespaceError::AtRoot => "AtRoot",
            _ => "other",
        };
        assert_eq!(kind, expected);
        assert_eq!(namespace.cursor_path(), "root");
    }

    #[test]
    fn move_file_relinks_and_renames() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("docs").unwrap();
        namespace.change_directory("docs").unwrap();
        namespace.create_directory("archive").unwrap();
        namespace.change_directory("/").unwrap();
        let file = namespace.create_file("report.txt").unwrap();
        let base = namespace.base_path().to_path_buf();

        namespace.move_file("report.txt", "docs/archive").unwrap();

        assert_eq!(namespace.list(), vec!["docs"]);
        assert_eq!(namespace.real_path(file), base.join("docs/archive/report.txt"));
        assert!(base.join("docs/archive/report.txt").is_file());
        assert!(!base.join("report.txt").exists());
        assert_eq!(namespace.virtual_path(file), "root/docs/archive/report.txt");
    }

    #[test]
    fn move_target_is_relative_only() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("a").unwrap();
        namespace.change_directory("a").unwrap();
        namespace.create_file("f").unwrap();

        let result = namespace.move_file("f", "..");
        assert!(matches!(result, Err(NamespaceError::TargetNotFound { .. })));
        assert_eq!(namespace.list(), vec!["f"]);
        assert!(namespace.base_path().join("a/f").is_file());
    }

    #[rstest]
    #[case("missing", "dir", "NotFound")]
    #[case("dir", "dir", "NotAFile")]
    #[case("f", "nowhere", "TargetNotFound")]
    #[case("f", "other.txt", "TargetNotFound")]
    #[case("f", "", "TargetNotFound")]
    fn invalid_moves_are_rejected(
        #[case] file: &str,
        #[case] target: &str,
        #[case] expected: &str,
    ) {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("dir").unwrap();
        namespace.create_file("f").unwrap();
        namespace.create_file("other.txt").unwrap();

        let kind = match namespace.move_file(file, target).unwrap_err() {
            NamespaceError::NotFound { .. } => "NotFound",
            NamespaceError::NotAFile { .. } => "NotAFile",
            NamespaceError::TargetNotFound { .. } => "TargetNotFound",
            _ => "other",
        };
        assert_eq!(kind, expected);
        assert_eq!(namespace.list(), vec!["dir", "f", "other.txt"]);
    }

    #[test]
    fn move_refuses_to_overwrite_in_target() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("dir").unwrap();
        namespace.change_directory("dir").unwrap();
        namespace.create_file("f").unwrap();
        namespace.change_directory("..").unwrap();
        namespace.create_file("f").unwrap();

        let result = namespace.move_file("f", "dir");
        assert!(matches!(result, Err(NamespaceError::AlreadyExists { .. })));
        assert_eq!(namespace.list(), vec!["dir", "f"]);
    }

    #[test]
    fn failed_rename_leaves_both_trees_unchanged() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("dir").unwrap();
        namespace.create_file("f").unwrap();
        fs::remove_dir(namespace.base_path().join("dir")).unwrap();

        let result = namespace.move_file("f", "dir");
        assert!(matches!(result, Err(NamespaceError::IoFailure { .. })));
        assert_eq!(namespace.list(), vec!["dir", "f"]);
        assert!(namespace.base_path().join("f").is_file());
    }

    #[test]
    fn delete_file_and_directory_recursively() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("dir").unwrap();
        namespace.change_directory("dir").unwrap();
        namespace.create_directory("nested").unwrap();
        namespace.create_file("inner.txt").unwrap();
        namespace.change_directory("..").unwrap();
        namespace.create_file("top.txt").unwrap();
        let base = namespace.base_path().to_path_buf();

        assert_eq!(namespace.delete("top.txt").unwrap(), 1);
        assert!(!base.join("top.txt").exists());
        assert_eq!(namespace.delete("dir").unwrap(), 3);
        assert!(!base.join("dir").exists());
        assert!(namespace.list().is_empty());
        assert_eq!(namespace.tree().len(), 1);
        assert_eq!(fs::read_dir(&base).unwrap().count(), 0);
    }

    #[test]
    fn delete_missing_name_fails() {
        let (_temp_dir, mut namespace) = namespace();
        assert!(matches!(
            namespace.delete("ghost"),
            Err(NamespaceError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_tolerates_entries_already_gone_from_disk() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_file("f").unwrap();
        namespace.create_directory("d").unwrap();
        fs::remove_file(namespace.base_path().join("f")).unwrap();
        fs::remove_dir(namespace.base_path().join("d")).unwrap();

        namespace.delete("f").unwrap();
        namespace.delete("d").unwrap();
        assert!(namespace.list().is_empty());
    }

    #[test]
    fn move_refuses_to_replace_untracked_real_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path().join("vfs");
        fs::create_dir_all(base.join("dir")).unwrap();
        fs::write(base.join("dir/f"), "precious").unwrap();

        let mut namespace = Namespace::open_empty(&base).unwrap();
        namespace.create_directory("dir").unwrap();
        namespace.create_file("f").unwrap();

        let result = namespace.move_file("f", "dir");
        assert!(matches!(result, Err(NamespaceError::AlreadyExists { .. })));
        assert_eq!(namespace.list(), vec!["dir", "f"]);
        assert!(base.join("f").is_file());
        assert_eq!(fs::read_to_string(base.join("dir/f")).unwrap(), "precious");
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn delete_stages_beside_a_sibling_with_the_staging_name(#[case] sibling_is_directory: bool) {
        let (_temp_dir, mut namespace) = namespace();
        let sibling = format!(".d.deleting-{}", std::process::id());
        namespace.create_directory("d").unwrap();
        if sibling_is_directory {
            namespace.create_directory(&sibling).unwrap();
        } else {
            namespace.create_file(&sibling).unwrap();
        }

        namespace.delete("d").unwrap();

        assert_eq!(namespace.list(), vec![sibling.clone()]);
        let real_sibling = namespace.base_path().join(&sibling);
        assert_eq!(real_sibling.is_dir(), sibling_is_directory);
        assert_eq!(real_sibling.is_file(), !sibling_is_directory);
        assert!(!namespace.base_path().join("d").exists());
    }

    #[test]
    fn staging_path_skips_names_taken_on_disk() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("d").unwrap();
        let real_path = namespace.base_path().join("d");
        let taken = format!(".d.deleting-{}", std::process::id());
        fs::create_dir(namespace.base_path().join(&taken)).unwrap();

        let staging = namespace.staging_path(&real_path, "d").unwrap();
        assert_eq!(staging, namespace.base_path().join(format!("{taken}-1")));
    }

    #[test]
    fn undo_rename_puts_the_entry_back() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("d").unwrap();
        let original = namespace.base_path().join("d");
        let staged = namespace.base_path().join(".d.staged");
        fs::rename(&original, &staged).unwrap();

        namespace.undo_rename(&staged, &original);

        assert!(original.is_dir());
        assert!(!staged.exists());
        assert_eq!(namespace.list(), vec!["d"]);
    }

    #[test]
    fn failed_undo_rename_resyncs_from_disk() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("kept").unwrap();
        namespace.create_directory("lost").unwrap();
        let lost = namespace.base_path().join("lost");
        fs::remove_dir(&lost).unwrap();

        let staged = namespace.base_path().join(".lost.staged");
        namespace.undo_rename(&staged, &lost);

        assert_eq!(namespace.list(), vec!["kept"]);
    }

    #[test]
    fn real_path_follows_moves_without_recreation() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("target").unwrap();
        let file = namespace.create_file("f").unwrap();
        let before = namespace.real_path(file);
        namespace.move_file("f", "target").unwrap();
        let after = namespace.real_path(file);

        assert_ne!(before, after);
        assert_eq!(after, namespace.base_path().join("target").join("f"));
        assert!(namespace.tree().contains(file));
    }

    #[test]
    fn reload_from_disk_picks_up_external_changes_and_keeps_cursor() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("work").unwrap();
        namespace.change_directory("work").unwrap();
        fs::write(namespace.base_path().join("work/external.txt"), "").unwrap();

        namespace.reload_from_disk().unwrap();
        assert_eq!(namespace.cursor_path(), "root/work");
        assert_eq!(namespace.list(), vec!["external.txt"]);
    }

    #[test]
    fn reload_from_disk_falls_back_to_root() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("gone").unwrap();
        namespace.change_directory("gone").unwrap();
        fs::remove_dir(namespace.base_path().join("gone")).unwrap();

        namespace.reload_from_disk().unwrap();
        assert_eq!(namespace.cursor_path(), "root");
        assert!(namespace.list().is_empty());
    }

    #[test]
    fn file_real_path_requires_a_file() {
        let (_temp_dir, mut namespace) = namespace();
        namespace.create_directory("dir").unwrap();
        namespace.create_file("f").unwrap();
        assert_eq!(
            namespace.file_real_path("f").unwrap(),
            namespace.base_path().join("f")
        );
        assert!(matches!(
            namespace.file_real_path("dir"),
            Err(NamespaceError::NotAFile { .. })
        ));
        assert!(matches!(
            namespace.file_real_path("nope"),
            Err(NamespaceError::NotFound { .. })
        ));
    }
}
