mod destroy;
pub use destroy::destroy;

mod import;
pub use import::import;

mod kinit;
pub use kinit::kinit;

mod kvno;
pub use kvno::kvno;

mod list;
pub use list::list;
