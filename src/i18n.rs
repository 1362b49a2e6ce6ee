//! Locale handling and the static translation table.
//!
//! The locale is always passed explicitly (query param or request field),
//! never read from ambient state. Message keys map to English/Arabic pairs.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "ar" => Locale::Ar,
            _ => Locale::En,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }
}

/// (key, english, arabic)
static TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("name_required", "Please enter your full name", "يرجى إدخال الاسم الكامل"),
    ("invalid_email", "Please enter a valid email address", "يرجى إدخال بريد إلكتروني صحيح"),
    ("invalid_phone", "Please enter a valid phone number", "يرجى إدخال رقم هاتف صحيح"),
    ("emirate_required", "Please select an emirate", "يرجى اختيار الإمارة"),
    ("city_required", "Please select a city", "يرجى اختيار المدينة"),
    ("address_required", "Please enter your address", "يرجى إدخال العنوان"),
    ("complete_address", "Please enter a complete address", "يرجى إدخال عنوان كامل"),
    ("cart_empty", "Your cart is empty", "سلة التسوق فارغة"),
    ("invalid_step", "Please complete the previous step first", "يرجى إكمال الخطوة السابقة أولاً"),
    ("product_not_found", "Product not found", "المنتج غير موجود"),
    ("variation_unavailable", "This option is not available", "هذا الخيار غير متوفر"),
    ("out_of_stock", "Out of stock", "غير متوفر في المخزون"),
    ("payment_failed", "Payment failed", "فشل الدفع"),
    ("order_creation_failed", "Order creation failed, please contact support", "فشل إنشاء الطلب، يرجى التواصل مع الدعم"),
    ("order_confirmed", "Your order has been confirmed", "تم تأكيد طلبك"),
    ("free_shipping", "Free shipping", "شحن مجاني"),
    ("newsletter_subscribed", "You are subscribed to our newsletter", "تم الاشتراك في النشرة البريدية"),
];

/// Look up a message key for a locale. Unknown keys echo back the key so a
/// missing translation shows up in the UI instead of crashing a request.
pub fn t<'a>(locale: Locale, key: &'a str) -> &'a str {
    for (k, en, ar) in TRANSLATIONS {
        if *k == key {
            return match locale {
                Locale::En => en,
                Locale::Ar => ar,
            };
        }
    }
    tracing::debug!(key, "missing translation key");
    key
}

/// Select bilingual catalog content, falling back to English when the
/// Arabic side is blank.
pub fn content_by_lang<'a>(locale: Locale, en: &'a str, ar: &'a str) -> &'a str {
    match locale {
        Locale::Ar if !ar.trim().is_empty() => ar,
        _ => en,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("ar"), Locale::Ar);
        assert_eq!(Locale::from_tag("AR"), Locale::Ar);
        assert_eq!(Locale::from_tag("en"), Locale::En);
        assert_eq!(Locale::from_tag("fr"), Locale::En);
    }

    #[test]
    fn test_translation_lookup() {
        assert_eq!(t(Locale::En, "address_required"), "Please enter your address");
        assert_eq!(t(Locale::Ar, "cart_empty"), "سلة التسوق فارغة");
    }

    #[test]
    fn test_content_by_lang_fallback() {
        assert_eq!(content_by_lang(Locale::Ar, "Espresso Blend", ""), "Espresso Blend");
        assert_eq!(content_by_lang(Locale::Ar, "Espresso Blend", "خلطة إسبريسو"), "خلطة إسبريسو");
        assert_eq!(content_by_lang(Locale::En, "Espresso Blend", "خلطة إسبريسو"), "Espresso Blend");
    }
}
