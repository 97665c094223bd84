use crate::field::{FieldDef, Schema, Shape};

/// A visible leaf field reached from the record root
#[derive(Debug, Clone)]
pub struct Leaf {
    pub def: &'static FieldDef,
    /// Field names from the root, one per nesting level
    pub segments: Vec<&'static str>,
    /// Field indices from the root, for slot lookup on an instance
    pub indices: Vec<usize>,
}

impl Leaf {
    /// Dotted qualified path, e.g. `postgres.port`
    pub fn path(&self) -> String {
        self.segments.join(".")
    }
}

/// Depth-first, declaration-order iterator over the visible leaves of a schema.
///
/// Hidden fields are skipped; nested records contribute their children, never
/// themselves. The walk depends only on the schema, so every call yields the
/// same sequence.
pub struct Walk {
    stack: Vec<(&'static [FieldDef], usize)>,
    segments: Vec<&'static str>,
    indices: Vec<usize>,
}

pub fn walk(schema: &'static Schema) -> Walk {
    Walk {
        stack: vec![(schema.fields, 0)],
        segments: Vec::new(),
        indices: Vec::new(),
    }
}

impl Iterator for Walk {
    type Item = Leaf;

    fn next(&mut self) -> Option<Leaf> {
        loop {
            let &mut (fields, index) = self.stack.last_mut()?;
            let Some(def) = fields.get(index) else {
                self.stack.pop();
                // Leaving a nested record; drop its segment.
                self.segments.pop();
                self.indices.pop();
                continue;
            };
            if let Some(frame) = self.stack.last_mut() {
                frame.1 += 1;
            }

            if def.hidden {
                continue;
            }
            match def.shape {
                Shape::Leaf(_) => {
                    let mut segments = self.segments.clone();
                    segments.push(def.name);
                    let mut indices = self.indices.clone();
                    indices.push(index);
                    return Some(Leaf {
                        def,
                        segments,
                        indices,
                    });
                }
                Shape::Record(nested) => {
                    self.segments.push(def.name);
                    self.indices.push(index);
                    self.stack.push((nested().fields, 0));
                }
                Shape::Opaque => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, kind::Kind};

    #[derive(Default, Record)]
    struct Inner {
        a: u8,
        #[config(skip)]
        hidden: u8,
        b: String,
    }

    #[derive(Default, Record)]
    struct Middle {
        #[config(nested)]
        inner: Inner,
        c: bool,
    }

    #[derive(Default, Record)]
    struct Outer {
        first: String,
        #[config(nested)]
        middle: Middle,
        #[config(nested)]
        empty: Empty,
        last: Vec<u16>,
    }

    #[derive(Default, Record)]
    struct Empty {}

    #[test]
    fn test_walk_order_and_paths() {
        let paths: Vec<String> = walk(Outer::describe()).map(|leaf| leaf.path()).collect();
        assert_eq!(
            paths,
            [
                "first",
                "middle.inner.a",
                "middle.inner.b",
                "middle.c",
                "last"
            ]
        );
    }

    #[test]
    fn test_walk_indices_skip_hidden() {
        let leaves: Vec<Leaf> = walk(Outer::describe()).collect();
        assert_eq!(leaves[1].indices, [1, 0, 0]);
        assert_eq!(leaves[2].indices, [1, 0, 2]);
        assert_eq!(leaves[4].indices, [3]);
    }

    #[test]
    fn test_walk_is_restartable() {
        let first: Vec<String> = walk(Outer::describe()).map(|leaf| leaf.path()).collect();
        let second: Vec<String> = walk(Outer::describe()).map(|leaf| leaf.path()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_walk_leaf_kinds() {
        let kinds: Vec<Kind> = walk(Outer::describe())
            .filter_map(|leaf| leaf.def.kind())
            .collect();
        assert_eq!(kinds[0], Kind::String);
        assert_eq!(kinds[4], Kind::Sequence(Box::new(Kind::Int { signed: false, bits: 16 })));
    }

    #[test]
    fn test_walk_empty_record() {
        assert_eq!(walk(Empty::describe()).count(), 0);
    }
}
