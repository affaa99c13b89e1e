use serde::Serialize;

pub(super) const PAYMENT_TYPE_DEBIT: &str = "debit";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MerchantPaymInfo<'a> {
    pub reference: &'a str,
    pub destination: &'a str,
    pub comment: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateInvoiceBody<'a> {
    pub amount: u64, // minor units
    pub ccy: u16,    // ISO-4217 numeric code
    pub merchant_paym_info: MerchantPaymInfo<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_hook_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<&'a str>,
    pub payment_type: &'static str,
    pub reference: &'a str,
}

#[derive(Serialize)]
pub(super) struct InvoiceStatusQuery<'a> {
    #[serde(rename = "invoiceId")]
    pub invoice_id: &'a str,
}
