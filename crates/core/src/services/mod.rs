//! Business logic services.

pub mod catalog;
pub mod exhibit;
pub mod identity;
pub mod localization;
pub mod pagination;
pub mod photo;
pub mod qr;

pub use catalog::{
    BlockService, CatalogText, CreateBlockInput, CreateMuseumInput, CreateSectionInput,
    MuseumService, SectionOption, SectionService, UpdateSectionInput,
};
pub use exhibit::{
    CreateExhibitInput, ExhibitCard, ExhibitDetail, ExhibitService, ExhibitText,
    PublicListQuery, UpdateExhibitInput,
};
pub use identity::{ExhibitIdentity, build_slug, next_sequence_no, retry_on_conflict};
pub use localization::{Language, LocalizedContent, Variants, first_filled, resolve_language};
pub use pagination::Page;
pub use photo::{
    Ci360Manifest, CreatePhotoInput, FRAME_FILENAME_PATTERN, PhotoService, PhotoUpload,
    PhotoView, UpdatePhotoInput, classify,
};
pub use qr::{LabelLayout, QrComposer, QrRenderer, qr_payload};
