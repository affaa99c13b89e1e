use std::fmt::Write;

use super::order::{DeliveryModel, OrderPayloadModel};

/// message delivered to store admins once an invoice is paid,
/// the text is formatted in Telegram-flavoured Markdown
#[derive(Debug, Clone, PartialEq)]
pub struct AdminNotifyModel {
    pub text: String,
    pub buyer_first_name: String,
    pub buyer_last_name: String,
    pub reference: String,
}

pub fn escape_markdown(raw: &str) -> String {
    raw.chars().fold(String::with_capacity(raw.len()), |mut out, c| {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
        out
    })
}

pub fn fmt_minor_units(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

fn currency_label(code: u16) -> String {
    match code {
        980 => "грн".to_string(),
        840 => "USD".to_string(),
        978 => "EUR".to_string(),
        other => other.to_string(),
    }
}

impl From<&OrderPayloadModel> for AdminNotifyModel {
    fn from(value: &OrderPayloadModel) -> Self {
        let form = &value.form;
        let buyer = &form.buyer;
        let ccy = currency_label(form.currency);
        let mut text = String::new();
        // writing to `String` never fails
        let _ = writeln!(text, "✅ Оплата успішна!");
        let _ = writeln!(text, "🧾 Замовлення: *{}*", escape_markdown(&value.reference));
        let _ = writeln!(text, "💰 Оплачено: {} {}", fmt_minor_units(form.amount), ccy);
        let _ = writeln!(text, "💰 Повна сума: {} {}", fmt_minor_units(form.full_amount), ccy);
        if let Some(p) = form.promocode.as_ref() {
            let _ = writeln!(text, "🎫 Промокод: {}", escape_markdown(p));
        }
        let _ = writeln!(text, "\n👤 Покупець:");
        let _ = writeln!(text, "• Імʼя: {}", escape_markdown(&buyer.first_name));
        let _ = writeln!(text, "• Прізвище: {}", escape_markdown(&buyer.last_name));
        let _ = writeln!(text, "• Телефон: {}", escape_markdown(&buyer.phone));
        let _ = writeln!(text, "• Оплата: {}", form.payment_option.label());
        if let Some(tg) = buyer.telegram_name.as_ref() {
            let _ = writeln!(text, "• Telegram: {}", escape_markdown(tg));
        }
        let _ = writeln!(text, "\n🛒 Товари:");
        form.lines
            .iter()
            .map(|line| {
                let _ = writeln!(
                    text,
                    "• {} {} - {} шт. по {} {}",
                    escape_markdown(&line.name),
                    escape_markdown(&line.article),
                    line.quantity,
                    fmt_minor_units(line.unit_price),
                    ccy
                );
            })
            .count();
        match &form.delivery {
            DeliveryModel::Pickup => {
                let _ = write!(text, "\n🚚 Доставка: самовивіз");
            }
            DeliveryModel::CarrierDelivery { settlement, warehouse } => {
                let _ = write!(
                    text,
                    "\n🚚 Нова Пошта: {}, відділення {}",
                    escape_markdown(settlement),
                    escape_markdown(warehouse)
                );
            }
        }
        if let Some(c) = form.comment.as_ref() {
            let _ = write!(text, "\n\n📝 Коментар: {}", escape_markdown(c));
        }
        Self {
            text,
            buyer_first_name: buyer.first_name.clone(),
            buyer_last_name: buyer.last_name.clone(),
            reference: value.reference.clone(),
        }
    } // end of fn from
}
