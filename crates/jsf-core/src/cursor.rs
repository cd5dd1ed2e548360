use std::fmt;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

impl PathSeg {
    pub fn key(name: &str) -> Self {
        PathSeg::Key(name.to_string())
    }
}

impl fmt::Display for PathSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSeg::Key(k) if k.contains(['~', '/']) => {
                write!(f, "{}", k.replace('~', "~0").replace('/', "~1"))
            }
            PathSeg::Key(k) => write!(f, "{}", k),
            PathSeg::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Position of a format inside its tree, as a path from the root.
///
/// Only scope guards move the cursor: they push one segment on entry and
/// truncate back to the depth they captured when they are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    segs: Vec<PathSeg>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.segs.len()
    }

    pub fn is_root(&self) -> bool {
        self.segs.is_empty()
    }

    pub fn segments(&self) -> &[PathSeg] {
        &self.segs
    }

    pub(crate) fn push(&mut self, seg: PathSeg) {
        self.segs.push(seg);
    }

    pub(crate) fn truncate(&mut self, depth: usize) {
        self.segs.truncate(depth);
    }
}

/// Formats as an RFC 6901 JSON Pointer (`""` for the root).
impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segs {
            write!(f, "/{}", seg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_json_pointer() {
        let mut c = Cursor::new();
        assert_eq!(c.to_string(), "");
        c.push(PathSeg::key("a/b"));
        c.push(PathSeg::Index(3));
        c.push(PathSeg::key("~x"));
        assert_eq!(c.to_string(), "/a~1b/3/~0x");
        c.truncate(1);
        assert_eq!(c.depth(), 1);
        assert_eq!(c.to_string(), "/a~1b");
    }
}
