//! Domain services
//!
//! Services sit between the HTTP handlers and the stores. They never reach
//! into another service's store for writes; cross-entity reads go through
//! the [`SongCatalog`](crate::store::SongCatalog) port.

pub mod albums;
pub mod collaborations;
pub mod playlists;
pub mod songs;
pub mod users;

pub use albums::AlbumService;
pub use collaborations::CollaborationService;
pub use playlists::PlaylistService;
pub use songs::SongService;
pub use users::UserService;

use crate::access::PlaylistAccess;
use crate::store::Stores;

/// Every service, wired over one set of stores
#[derive(Clone)]
pub struct Services {
    pub songs: SongService,
    pub albums: AlbumService,
    pub playlists: PlaylistService,
    pub collaborations: CollaborationService,
    pub users: UserService,
}

impl Services {
    pub fn new(stores: Stores) -> Self {
        let collaborations = CollaborationService::new(stores.collaborations.clone());
        let access = PlaylistAccess::new(stores.playlists.clone(), collaborations.clone());

        Self {
            songs: SongService::new(stores.songs),
            albums: AlbumService::new(stores.albums, stores.catalog.clone()),
            playlists: PlaylistService::new(
                stores.playlists,
                stores.catalog,
                stores.users.clone(),
                stores.collaborations,
                access,
            ),
            collaborations,
            users: UserService::new(stores.users),
        }
    }
}
