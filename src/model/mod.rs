mod invoice;
mod notify;
mod order;
mod reference;

pub use invoice::{InvoiceCreateReqModel, InvoiceEventStatus, ProcessorRawRespModel};
pub use notify::{escape_markdown, fmt_minor_units, AdminNotifyModel};
pub use order::{
    BuyerModel, DeliveryModel, OrderFormModel, OrderLineModel, OrderPayloadModel,
    PaymentOptionModel, DEFAULT_CURRENCY,
};
pub use reference::{ReferenceCodeError, ReferenceCodeModel, CODE_ALPHABET, MONTH_LETTERS};
