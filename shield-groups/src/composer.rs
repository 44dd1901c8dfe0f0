/// Group composition: validate, assemble, write once, hand off.
///
/// `GroupComposer::create` runs these steps in order:
/// 1. Trim the name. Blank → `ValidationError::EmptyName`; nothing is written
///    and the selection is untouched.
/// 2. Assemble members: the acting user first, then the selection in order.
/// 3. Build the `chats` document (`admins = [creator email]`, no messages,
///    `lastUpdated = now`).
/// 4. One atomic create. No lookup of existing groups: identical groups
///    created twice are two documents.
/// 5. After the store acknowledges: navigate to the new conversation, then
///    clear the selection.
///
/// A failed write skips step 5 and is returned to the caller with the
/// selection intact, so the user can retry.

use chrono::Utc;

use crate::error::ComposeError;
use crate::group::{ChatDocument, GroupName};
use crate::ids::GroupId;
use crate::selection::SelectionModel;
use crate::store::ChatStore;
use crate::user::CurrentUser;

// ---------------------------------------------------------------------------
// Navigation contract (app implements)
// ---------------------------------------------------------------------------

pub trait Navigator {
    /// Open the conversation screen for a freshly created group.
    fn go_to_conversation(&mut self, id: &GroupId, display_name: &str);
}

// ---------------------------------------------------------------------------
// GroupComposer
// ---------------------------------------------------------------------------

pub struct GroupComposer<S, N> {
    store: S,
    navigator: N,
}

impl<S: ChatStore, N: Navigator> GroupComposer<S, N> {
    pub fn new(store: S, navigator: N) -> Self {
        GroupComposer { store, navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(
        &mut self,
        name: &str,
        selection: &mut SelectionModel,
        current: &CurrentUser,
    ) -> Result<GroupId, ComposeError> {
        let name = GroupName::parse(name).map_err(|e| {
            log::debug!("Group creation rejected: {}", e);
            e
        })?;
        let display_name = name.as_str().to_string();

        let document = ChatDocument::new_group(name, current, &selection.users(), Utc::now());
        let member_count = document.members.len();

        let id = self.store.create_chat(document).await.map_err(|e| {
            log::error!("Group \"{}\" not created: {}", display_name, e);
            e
        })?;

        log::info!("Created group {} with {} members", id, member_count);
        self.navigator.go_to_conversation(&id, &display_name);
        selection.clear();
        Ok(id)
    }
}
