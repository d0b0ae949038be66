//! In-memory folder/file tree shared by the file explorer and Terminal++.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("Path must start with '/'")]
    NotAbsolute,
    #[error("Path does not exist.")]
    NotFound,
    #[error("'{0}' is not a folder.")]
    NotAFolder(String),
    #[error("'{0}' is not a file.")]
    NotAFile(String),
    #[error("File or folder with this name already exists.")]
    AlreadyExists,
    #[error("Name cannot be empty.")]
    EmptyName,
    #[error("Name cannot contain '/'.")]
    InvalidName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Folder(BTreeMap<String, Node>),
    File(String),
}

impl Node {
    fn folder() -> Self {
        Node::Folder(BTreeMap::new())
    }

    fn file(content: &str) -> Self {
        Node::File(content.to_string())
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }
}

/// Absolute location of a folder, as a list of segments below the root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VfsPath(Vec<String>);

impl VfsPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an absolute `/a/b` style path. Empty segments are ignored.
    pub fn parse(raw: &str) -> Result<Self, FsError> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(FsError::NotAbsolute);
        }
        Ok(Self(
            raw.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.0.clone();
        segments.pop();
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_folder: bool,
}

impl DirEntry {
    /// Listing label: folders carry a `[Folder]` prefix.
    pub fn label(&self) -> String {
        if self.is_folder {
            format!("[Folder] {}", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFs {
    root: BTreeMap<String, Node>,
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::seeded()
    }
}

impl VirtualFs {
    pub fn empty() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// The tree every session starts with.
    pub fn seeded() -> Self {
        let mut fs = Self::empty();
        let root = &mut fs.root;
        root.insert(
            "Documents".into(),
            Node::Folder(BTreeMap::from([(
                "readme.txt".to_string(),
                Node::file("Welcome to the File Explorer!\nThis is a sample file."),
            )])),
        );
        root.insert(
            "Notes.txt".into(),
            Node::file("These are some notes in a text file."),
        );
        root.insert("EmptyFolder".into(), Node::folder());
        root.insert(
            "home".into(),
            Node::Folder(BTreeMap::from([
                (
                    "welcome.txt".to_string(),
                    Node::file("Welcome to term-desk!"),
                ),
                (
                    "info.md".to_string(),
                    Node::file("This is a virtual OS terminal."),
                ),
            ])),
        );
        root.insert(
            "docs".into(),
            Node::Folder(BTreeMap::from([(
                "readme.txt".to_string(),
                Node::file("This is your documents folder."),
            )])),
        );
        fs
    }

    fn folder(&self, path: &VfsPath) -> Result<&BTreeMap<String, Node>, FsError> {
        let mut current = &self.root;
        for segment in path.segments() {
            match current.get(segment) {
                Some(Node::Folder(children)) => current = children,
                Some(Node::File(_)) => return Err(FsError::NotAFolder(segment.clone())),
                None => return Err(FsError::NotFound),
            }
        }
        Ok(current)
    }

    fn folder_mut(&mut self, path: &VfsPath) -> Result<&mut BTreeMap<String, Node>, FsError> {
        let mut current = &mut self.root;
        for segment in path.segments() {
            match current.get_mut(segment) {
                Some(Node::Folder(children)) => current = children,
                Some(Node::File(_)) => return Err(FsError::NotAFolder(segment.clone())),
                None => return Err(FsError::NotFound),
            }
        }
        Ok(current)
    }

    pub fn is_folder(&self, path: &VfsPath) -> bool {
        self.folder(path).is_ok()
    }

    /// Folder contents: folders first, then files, each sorted by name.
    pub fn list(&self, path: &VfsPath) -> Result<Vec<DirEntry>, FsError> {
        let folder = self.folder(path)?;
        let mut entries: Vec<DirEntry> = folder
            .iter()
            .map(|(name, node)| DirEntry {
                name: name.clone(),
                is_folder: node.is_folder(),
            })
            .collect();
        entries.sort_by(|a, b| b.is_folder.cmp(&a.is_folder).then(a.name.cmp(&b.name)));
        Ok(entries)
    }

    pub fn read_file(&self, path: &VfsPath, name: &str) -> Result<&str, FsError> {
        match self.folder(path)?.get(name) {
            Some(Node::File(content)) => Ok(content),
            Some(Node::Folder(_)) => Err(FsError::NotAFile(name.to_string())),
            None => Err(FsError::NotFound),
        }
    }

    /// Overwrite an existing file or create it.
    pub fn write_file(&mut self, path: &VfsPath, name: &str, content: &str) -> Result<(), FsError> {
        validate_name(name)?;
        let folder = self.folder_mut(path)?;
        match folder.get_mut(name) {
            Some(Node::Folder(_)) => Err(FsError::NotAFile(name.to_string())),
            Some(Node::File(existing)) => {
                *existing = content.to_string();
                Ok(())
            }
            None => {
                folder.insert(name.to_string(), Node::file(content));
                Ok(())
            }
        }
    }

    pub fn create_file(&mut self, path: &VfsPath, name: &str) -> Result<(), FsError> {
        self.insert_new(path, name, Node::file(""))
    }

    pub fn create_folder(&mut self, path: &VfsPath, name: &str) -> Result<(), FsError> {
        self.insert_new(path, name, Node::folder())
    }

    fn insert_new(&mut self, path: &VfsPath, name: &str, node: Node) -> Result<(), FsError> {
        validate_name(name)?;
        let folder = self.folder_mut(path)?;
        if folder.contains_key(name) {
            return Err(FsError::AlreadyExists);
        }
        folder.insert(name.to_string(), node);
        Ok(())
    }

    pub fn rename(&mut self, path: &VfsPath, from: &str, to: &str) -> Result<(), FsError> {
        validate_name(to)?;
        let folder = self.folder_mut(path)?;
        if folder.contains_key(to) {
            return Err(FsError::AlreadyExists);
        }
        let node = folder.remove(from).ok_or(FsError::NotFound)?;
        folder.insert(to.to_string(), node);
        Ok(())
    }

    pub fn remove(&mut self, path: &VfsPath, name: &str) -> Result<(), FsError> {
        self.folder_mut(path)?
            .remove(name)
            .map(|_| ())
            .ok_or(FsError::NotFound)
    }
}

fn validate_name(name: &str) -> Result<(), FsError> {
    if name.trim().is_empty() {
        return Err(FsError::EmptyName);
    }
    if name.contains('/') {
        return Err(FsError::InvalidName);
    }
    Ok(())
}
