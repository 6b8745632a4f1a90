//! Static binding between a document struct, its fixed id and its patch
//! type, so accessors and writers can be generic over the six documents.

use fest_state::*;

use crate::defaults::fallback_document;

pub trait ContentKind: Clone + Default + Send + Sync + 'static {
    const ID: ContentId;
    type Patch: Clone + Send + Sync + 'static;

    /// Unwrap the matching variant, `None` for any other document.
    fn from_document(doc: ContentDocument) -> Option<Self>;

    fn into_document(self) -> ContentDocument;

    fn updated_at(&self) -> u64;

    fn wrap_patch(patch: Self::Patch) -> ContentPatch;

    /// Static content shown when the store has nothing to serve.
    fn fallback() -> Self {
        Self::from_document(fallback_document(Self::ID)).unwrap_or_default()
    }
}

macro_rules! content_kind {
    ($($ty:ident => $patch:ident),+ $(,)?) => {
        $(impl ContentKind for $ty {
            const ID: ContentId = ContentId::$ty;
            type Patch = $patch;

            fn from_document(doc: ContentDocument) -> Option<Self> {
                match doc {
                    ContentDocument::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_document(self) -> ContentDocument {
                ContentDocument::$ty(self)
            }

            fn updated_at(&self) -> u64 {
                self.updated_at
            }

            fn wrap_patch(patch: Self::Patch) -> ContentPatch {
                ContentPatch::$ty(patch)
            }
        })+
    };
}

content_kind!(
    SiteMetadata => SiteMetadataPatch,
    HomePage => HomePagePatch,
    LineupPage => LineupPagePatch,
    SchedulePage => SchedulePagePatch,
    TicketsPage => TicketsPagePatch,
    Navigation => NavigationPatch,
);

/// An ordered sub-entity owned by one content document's list.
pub trait ListEntry: Ordered + Clone + Send + Sync + 'static {
    type Page: ContentKind;

    /// List name used in routes and error messages.
    const LIST: &'static str;

    fn entries(page: &Self::Page) -> &[Self];

    /// A patch that replaces the whole list and nothing else.
    fn replace_patch(entries: Vec<Self>) -> <Self::Page as ContentKind>::Patch;
}

macro_rules! list_entry {
    ($($ty:ident in $page:ident . $field:ident as $name:literal => $patch:ident),+ $(,)?) => {
        $(impl ListEntry for $ty {
            type Page = $page;
            const LIST: &'static str = $name;

            fn entries(page: &$page) -> &[Self] {
                &page.$field
            }

            fn replace_patch(entries: Vec<Self>) -> $patch {
                $patch {
                    $field: Some(entries),
                    ..Default::default()
                }
            }
        })+
    };
}

list_entry!(
    Artist in LineupPage.artists as "artists" => LineupPagePatch,
    ScheduleEvent in SchedulePage.events as "events" => SchedulePagePatch,
    TicketTier in TicketsPage.tiers as "tiers" => TicketsPagePatch,
    NavigationItem in Navigation.items as "items" => NavigationPatch,
);
