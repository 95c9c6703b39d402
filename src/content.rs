//! Content catalog - the route table and what each route displays
//!
//! Every content model gets a record route (`/artists/:cid`) and a list
//! route (`/artists`). Record routes pick a key/value widget, list routes
//! pick how one item is labelled and where selecting it leads.

use crate::page::{ListItem, ListPage, NavTarget, Preload, RecordPage, RouteData};
use crate::record::Record;
use crate::render::RenderOptions;
use crate::router::{params, Resolved, Route, RouteError, Router, NOT_FOUND};

pub static ROUTES: &[Route] = &[
    Route {
        name: "home",
        path: "/",
        backend: None,
        title: "Medium Tech | Home",
    },
    Route {
        name: "login",
        path: "/login",
        backend: Some("/core/auth/login"),
        title: "Medium Tech | Login",
    },
    Route {
        name: "users",
        path: "/users",
        backend: Some("/core/users"),
        title: "Medium Tech | Users",
    },
    // Before `user` so /users/me is not read as a cid
    Route {
        name: "me",
        path: "/users/me",
        backend: Some("/core/users/me"),
        title: "Medium Tech | Me",
    },
    Route {
        name: "user",
        path: "/users/:cid",
        backend: Some("/core/users/cid/:cid"),
        title: "Medium Tech | User",
    },
    Route {
        name: "artists",
        path: "/artists",
        backend: Some("/mart/artists"),
        title: "Medium Tech | Artists",
    },
    Route {
        name: "artist",
        path: "/artists/:cid",
        backend: Some("/mart/artists/cid/:cid"),
        title: "Medium Tech | Artist",
    },
    Route {
        name: "still-images",
        path: "/still-images",
        backend: Some("/mart/still-images"),
        title: "Medium Tech | Still Images",
    },
    Route {
        name: "still-image",
        path: "/still-images/:cid",
        backend: Some("/mart/still-images/cid/:cid"),
        title: "Medium Tech | Still Image",
    },
    Route {
        name: "image-files",
        path: "/image-files",
        backend: Some("/core/image-files"),
        title: "Medium Tech | Image Files",
    },
    Route {
        name: "image-file",
        path: "/image-files/:cid",
        backend: Some("/core/image-files/cid/:cid"),
        title: "Medium Tech | Image File",
    },
    Route {
        name: "image-releases",
        path: "/image-releases",
        backend: Some("/mart/image-releases"),
        title: "Medium Tech | Image Releases",
    },
    Route {
        name: "image-release",
        path: "/image-releases/:cid",
        backend: Some("/mart/image-releases/cid/:cid"),
        title: "Medium Tech | Image Release",
    },
    Route {
        name: "file-uploaders",
        path: "/file-uploaders",
        backend: Some("/core/file-uploader"),
        title: "Medium Tech | File Uploaders",
    },
    Route {
        name: "file-uploader",
        path: "/file-uploaders/:id",
        backend: Some("/core/file-uploader/:id"),
        title: "Medium Tech | File Uploader",
    },
    Route {
        name: NOT_FOUND,
        path: ".*",
        backend: None,
        title: "Medium Tech | Not Found",
    },
];

/// Entries of the home menu, in display order
pub const HOME_MENU: &[(&str, &str)] = &[
    ("Users", "users"),
    ("Artists", "artists"),
    ("Still images", "still-images"),
    ("Image files", "image-files"),
    ("Image releases", "image-releases"),
    ("File uploaders", "file-uploaders"),
    ("Me", "me"),
    ("Login", "login"),
];

pub fn router(backend_url: &str) -> Router {
    Router::new(ROUTES, backend_url)
}

/// The page shown for an activated route
pub enum Page {
    Home,
    Login,
    NotFound(String),
    Record(RecordPage),
    List(ListPage),
}

/// How a route is displayed
enum Content {
    Home,
    Login,
    Record {
        widget: fn() -> RenderOptions,
        authenticated: bool,
    },
    List {
        item: fn(&Record) -> ListItem,
    },
    NotFound,
}

fn content(route: &str) -> Content {
    match route {
        "home" => Content::Home,
        "login" => Content::Login,
        "users" => Content::List { item: user_item },
        "user" => Content::Record {
            widget: RenderOptions::default,
            authenticated: false,
        },
        "me" => Content::Record {
            widget: RenderOptions::default,
            authenticated: true,
        },
        "artists" => Content::List { item: artist_item },
        "artist" => Content::Record {
            widget: artist_widget,
            authenticated: false,
        },
        "still-images" => Content::List {
            item: still_image_item,
        },
        "still-image" => Content::Record {
            widget: RenderOptions::default,
            authenticated: false,
        },
        "image-files" => Content::List {
            item: image_file_item,
        },
        "image-file" => Content::Record {
            widget: image_file_widget,
            authenticated: false,
        },
        "image-releases" => Content::List {
            item: image_release_item,
        },
        "image-release" => Content::Record {
            widget: image_release_widget,
            authenticated: false,
        },
        "file-uploaders" => Content::List {
            item: file_uploader_item,
        },
        "file-uploader" => Content::Record {
            widget: RenderOptions::default,
            authenticated: false,
        },
        _ => Content::NotFound,
    }
}

/// Build the page for a resolved navigation URL
///
/// `preload` is whatever the navigation carried along; record and list
/// pages consume it, other pages drop it.
pub fn activate(resolved: Resolved, preload: Option<Preload>, page_size: usize) -> Page {
    let name = resolved.route.name;
    let data = RouteData {
        params: resolved.params,
        query: resolved.query,
        preload,
    };

    match content(name) {
        Content::Home => Page::Home,
        Content::Login => Page::Login,
        Content::Record {
            widget,
            authenticated,
        } => Page::Record(RecordPage::new(name, data, widget(), authenticated)),
        Content::List { item } => Page::List(ListPage::new(name, data, page_size, item, false)),
        Content::NotFound => Page::NotFound(name.to_string()),
    }
}

/// Navigation URL for a list item target
pub fn target_url(router: &Router, target: &NavTarget) -> Result<String, RouteError> {
    router.nav_url(target.route, &target.params, &Default::default())
}

fn artist_widget() -> RenderOptions {
    RenderOptions::default()
        .keys(&[
            "name",
            "short_name",
            "abreviated_name",
            "summary",
            "description",
            "mediums",
            "tags",
        ])
        .labels(&[
            "name",
            "short name",
            "abreviated name",
            "summary",
            "description",
            "mediums",
            "tags",
        ])
}

fn image_file_widget() -> RenderOptions {
    RenderOptions::default().keys(&["cid", "payload_cid", "height", "width"])
}

fn image_release_widget() -> RenderOptions {
    RenderOptions::default()
        .keys(&["cid", "title", "creator", "credits", "tags", "alt_text"])
        .labels(&["cid", "title", "creator", "credits", "tags", "alt text"])
}

fn item(label: String, route: &'static str, key: &str, record: &Record) -> ListItem {
    let id = record.text(key);
    ListItem {
        label,
        target: NavTarget {
            route,
            params: params([(key, id.as_str())]),
            preload: Some(Preload::Record(record.clone())),
        },
    }
}

fn user_item(user: &Record) -> ListItem {
    let full_name = format!("{} {}", user.text("first_name"), user.text("last_name"));
    item(full_name.trim().to_string(), "user", "cid", user)
}

fn artist_item(artist: &Record) -> ListItem {
    item(artist.text("name"), "artist", "cid", artist)
}

fn still_image_item(image: &Record) -> ListItem {
    item(image.text("cid"), "still-image", "cid", image)
}

fn image_file_item(image: &Record) -> ListItem {
    item(image.text("cid"), "image-file", "cid", image)
}

fn image_release_item(release: &Record) -> ListItem {
    item(release.text("cid"), "image-release", "cid", release)
}

fn file_uploader_item(uploader: &Record) -> ListItem {
    item(uploader.text("id"), "file-uploader", "id", uploader)
}
