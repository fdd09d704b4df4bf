//! Database entities.

#![allow(missing_docs)]

pub mod exhibit;
pub mod exhibit_photo;
pub mod museum;
pub mod museum_block;
pub mod museum_section;

pub use exhibit::Entity as Exhibit;
pub use exhibit_photo::Entity as ExhibitPhoto;
pub use museum::Entity as Museum;
pub use museum_block::Entity as MuseumBlock;
pub use museum_section::Entity as MuseumSection;
