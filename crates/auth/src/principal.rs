use serde::{Deserialize, Serialize};

use timberline_core::UserId;

use crate::RoleKind;

/// Authenticated caller of a marketplace operation.
///
/// Built from validated token claims at the transport boundary. Domain code
/// only ever sees this type, never the raw token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub role: RoleKind,
}

impl Caller {
    pub fn new(user_id: UserId, role: RoleKind) -> Self {
        Self { user_id, role }
    }

    pub fn landowner(user_id: UserId) -> Self {
        Self::new(user_id, RoleKind::Landowner)
    }

    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
