pub mod engine;
pub mod line;
pub mod message;
pub mod registry;
pub mod storage;

pub use engine::{
    CartEngine, CartState, CouponError, CouponRequest, CouponValidator, MAX_LINE_QUANTITY,
    ValidatedCoupon, normalize_code,
};
pub use line::{CartLine, LineProduct};
pub use message::{DeliveryDetails, OrderMessage, whatsapp_link};
pub use registry::{CartRegistry, PendingCheckout, PendingCoupon};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
