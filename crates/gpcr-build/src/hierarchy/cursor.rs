use uuid::Uuid;

/// Width of one zero-padded slug component
pub const SLUG_COMPONENT_WIDTH: usize = 3;

/// Family placed at one depth
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    id: Uuid,
    slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Frame {
    /// Last family resolved at this depth
    family: Option<Resolved>,
    /// Highest sibling number used at this depth under the current parent
    counter: u32,
}

/// Position in the family tree while walking the taxonomy file
///
/// Holds one frame per depth from 0 to the current depth. Frame `d` records
/// the family most recently resolved at depth `d` (the parent for depth
/// `d + 1`) and the sibling counter there. A new slug extends the slug of the
/// family one level up, so it always spells out the full ancestor path even
/// when that family was reused from elsewhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyCursor {
    frames: Vec<Frame>,
}

impl Default for HierarchyCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyCursor {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Push a fresh frame per level entered, pop one per level left
    pub fn move_to(&mut self, depth: usize) {
        self.frames.resize(depth + 1, Frame::default());
    }

    /// Family one level above `depth`; `None` at depth 0 or when unresolved
    pub fn parent(&self, depth: usize) -> Option<Uuid> {
        self.parent_frame(depth).map(|family| family.id)
    }

    fn parent_frame(&self, depth: usize) -> Option<&Resolved> {
        depth
            .checked_sub(1)
            .and_then(|above| self.frames.get(above))
            .and_then(|frame| frame.family.as_ref())
    }

    /// Bump the sibling counter at `depth` and return the slug for it
    ///
    /// The slug is the parent's slug plus one component. Without a recorded
    /// parent it falls back to the counters of every depth up to `depth`.
    pub fn next_slug(&mut self, depth: usize) -> String {
        if depth > self.depth() {
            self.move_to(depth);
        }
        self.frames[depth].counter += 1;
        let component = slug_component(self.frames[depth].counter);
        match self.parent_frame(depth) {
            Some(parent) => format!("{}_{}", parent.slug, component),
            None => self.slug(depth),
        }
    }

    /// `_`-joined counters for depths 0 through `depth`
    pub fn slug(&self, depth: usize) -> String {
        self.frames
            .iter()
            .take(depth + 1)
            .map(|frame| slug_component(frame.counter))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn record(&mut self, depth: usize, family: Uuid, slug: &str) {
        if let Some(frame) = self.frames.get_mut(depth) {
            frame.family = Some(Resolved {
                id: family,
                slug: slug.to_string(),
            });
        }
    }

    /// Raise the counter at `depth` to the last component of `slug`
    ///
    /// Used when an existing child of the current parent is reused, so the
    /// next new sibling does not take a number that is already stored.
    pub fn advance_past(&mut self, depth: usize, slug: &str) {
        let Some(last) = slug.rsplit('_').next().and_then(|c| c.parse::<u32>().ok()) else {
            return;
        };
        if let Some(frame) = self.frames.get_mut(depth) {
            frame.counter = frame.counter.max(last);
        }
    }

    /// Forget the family at `depth` so lines below it have no parent
    pub fn clear(&mut self, depth: usize) {
        if let Some(frame) = self.frames.get_mut(depth) {
            frame.family = None;
        }
    }
}

fn slug_component(counter: u32) -> String {
    format!("{:0width$}", counter, width = SLUG_COMPONENT_WIDTH)
}
