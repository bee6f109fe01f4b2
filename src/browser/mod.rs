//! Browser automation module
//!
//! The rendering side of the engine: browser lifecycle, navigation and DOM
//! snapshot capture through ChromiumOxide. [`BrowserController`] implements
//! [`Renderer`](crate::document::Renderer).

pub mod controller;
pub mod navigation;
pub mod snapshot;

pub use controller::{emulation_for, BrowserConfig, BrowserController, PageHandle};
pub use navigation::{NavigationOptions, NavigationResult, PageNavigator, UrlValidator, WaitUntil};
pub use snapshot::{
    build_tree, main_document_response, snapshot_script, DocumentResponse, FlatNode, PageSnapshot,
    RawSnapshot,
};
