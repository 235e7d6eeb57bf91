/// One step of a virtual path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Parent,
    Name(&'a str),
}

/// A parsed change-directory argument.
///
/// `/` alone or any path starting with `/` is resolved from the root, anything
/// else from the cursor. Empty segments are dropped, so `a//b/` reads as `a/b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath<'a> {
    absolute: bool,
    segments: Vec<Segment<'a>>,
}

impl<'a> VirtualPath<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let segments = raw
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| match part {
                ".." => Segment::Parent,
                name => Segment::Name(name),
            })
            .collect();

        VirtualPath {
            absolute: raw.starts_with('/'),
            segments,
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }
}

/// Splits a move target. Targets are always relative to the cursor, so
/// surrounding slashes are ignored and every part is taken as a child name,
/// `..` included.
pub fn target_segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.trim_matches('/').split('/')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn root_alone_is_absolute_and_empty() {
        let path = VirtualPath::parse("/");
        assert!(path.is_absolute());
        assert!(path.segments().is_empty());
    }

    #[rstest]
    #[case("a/b", false, vec![Segment::Name("a"), Segment::Name("b")])]
    #[case("/a/../b", true, vec![Segment::Name("a"), Segment::Parent, Segment::Name("b")])]
    #[case("a//b/", false, vec![Segment::Name("a"), Segment::Name("b")])]
    #[case("../..", false, vec![Segment::Parent, Segment::Parent])]
    fn parse_splits_segments(
        #[case] raw: &str,
        #[case] absolute: bool,
        #[case] expected: Vec<Segment<'static>>,
    ) {
        let path = VirtualPath::parse(raw);
        assert_eq!(path.is_absolute(), absolute);
        assert_eq!(path.segments(), expected.as_slice());
    }

    #[test]
    fn target_segments_keep_dot_dot_as_a_name() {
        assert_eq!(target_segments("/a/../b/").collect::<Vec<_>>(), vec!["a", "..", "b"]);
        assert_eq!(target_segments("").collect::<Vec<_>>(), vec![""]);
    }
}
