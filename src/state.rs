// Copyright 2026
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::sync::Arc;

use crate::infra::locks::KeyedLocks;
use crate::infra::pager::PagerBridge;
use crate::infra::store::AlertStore;

/// Explicit collaborators passed to every handler, rather than ambient
/// globals (§9: "pass them as explicit collaborators to the handler").
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AlertStore>,
    pub pager: Arc<dyn PagerBridge>,
    pub locks: Arc<KeyedLocks>,
}

impl AppState {
    pub fn new(store: Arc<dyn AlertStore>, pager: Arc<dyn PagerBridge>) -> AppState {
        AppState {
            store,
            pager,
            locks: Arc::new(KeyedLocks::new()),
        }
    }
}
