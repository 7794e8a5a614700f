use serde::Serialize;
use uuid::Uuid;

/// Identity behind the current request, possibly anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(Uuid),
}

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// True when the viewer is the given user.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.id() == Some(user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::User(_))
    }
}

impl From<Option<Uuid>> for Viewer {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::User)
    }
}
