//! Language and timezone lookup tables
//!
//! Every localized string the wearer can see lives here, so the passive
//! display path and the alert path never drift apart.

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use gluco_glance_core::GlanceError;
use gluco_glance_types::{Language, Severity};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Default zone per language, used when no explicit zone is configured
static LANGUAGE_ZONES: Lazy<HashMap<Language, Tz>> = Lazy::new(|| {
    [
        (Language::En, "America/New_York"),
        (Language::Es, "Europe/Madrid"),
        (Language::Fr, "Europe/Paris"),
        (Language::De, "Europe/Berlin"),
        (Language::Pt, "Europe/Lisbon"),
    ]
    .into_iter()
    .filter_map(|(language, name)| name.parse::<Tz>().ok().map(|tz| (language, tz)))
    .collect()
});

/// The zone a clock time is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneChoice {
    Named(Tz),
    /// The host's local zone
    System,
    Utc,
}

/// Default zone for a language, if one is known
pub fn language_default_zone(language: Language) -> Option<Tz> {
    LANGUAGE_ZONES.get(&language).copied()
}

/// Pick a zone: explicit zone, then the language default, then the system
/// zone. Invalid names fall through silently.
pub fn resolve_zone(explicit: Option<&str>, language: Language) -> ZoneChoice {
    if let Some(name) = explicit.map(str::trim).filter(|name| !name.is_empty()) {
        match name {
            "Local" | "local" | "system" => return ZoneChoice::System,
            "UTC" | "utc" => return ZoneChoice::Utc,
            _ => match name.parse::<Tz>() {
                Ok(tz) => return ZoneChoice::Named(tz),
                Err(_) => log::debug!("{}, ignoring", GlanceError::InvalidTimezone(name.to_string())),
            },
        }
    }
    language_default_zone(language)
        .map(ZoneChoice::Named)
        .unwrap_or(ZoneChoice::System)
}

/// Clock time in the given zone, in the language's customary style
pub fn format_clock(at: DateTime<Utc>, zone: ZoneChoice, language: Language) -> String {
    // en-US style 12-hour clock, 24-hour everywhere else
    let pattern = match language {
        Language::En => "%I:%M %p",
        _ => "%H:%M",
    };
    match zone {
        ZoneChoice::Named(tz) => at.with_timezone(&tz).format(pattern).to_string(),
        ZoneChoice::System => at.with_timezone(&Local).format(pattern).to_string(),
        ZoneChoice::Utc => at.format(pattern).to_string(),
    }
}

/// Persistent message shown when no data source is configured
pub fn configuration_needed(language: Language) -> &'static str {
    match language {
        Language::En => "Please configure your\nNightscout URL and token\nin the app settings",
        Language::Es => "Por favor configura tu\nURL y token de Nightscout\nen los ajustes de la app",
        Language::Fr => {
            "Veuillez configurer votre\nURL et token Nightscout\ndans les paramètres de l'app"
        }
        Language::De => {
            "Bitte Nightscout-URL\nund Token in den\nApp-Einstellungen festlegen"
        }
        Language::Pt => "Configure a sua\nURL e token do Nightscout\nnas definições da app",
    }
}

/// Ephemeral message shown when a requested reading could not be fetched
pub fn data_unavailable(language: Language) -> &'static str {
    match language {
        Language::En => "Glucose data unavailable\nCheck Nightscout connection",
        Language::Es => "Datos de glucosa no disponibles\nRevisa la conexión a Nightscout",
        Language::Fr => "Données de glycémie indisponibles\nVérifiez la connexion Nightscout",
        Language::De => "Glukosedaten nicht verfügbar\nNightscout-Verbindung prüfen",
        Language::Pt => "Dados de glicose indisponíveis\nVerifique a ligação ao Nightscout",
    }
}

/// Alert headline and advice for a severity band.
///
/// Returns `None` for the normal band, which never alerts. Languages without
/// a dedicated translation use English.
pub fn alert_text(severity: Severity, language: Language) -> Option<(&'static str, &'static str)> {
    use Severity::*;
    let text = match (language, severity) {
        (_, Normal) => return None,

        (Language::Es, CriticalLow) => ("ALERTA: GLUCOSA MUY BAJA!", "Tratar ahora"),
        (Language::Es, Low) => ("ALERTA GLUCOSA BAJA!", "Revisar inmediatamente"),
        (Language::Es, High) => ("ALERTA GLUCOSA ALTA!", "Tomar medidas"),
        (Language::Es, CriticalHigh) => ("ALERTA: GLUCOSA MUY ALTA!", "Actuar ahora"),

        (Language::Fr, CriticalLow) => ("ALERTE: GLYCÉMIE TRÈS BASSE!", "Traiter maintenant"),
        (Language::Fr, Low) => ("ALERTE GLYCÉMIE BASSE!", "Vérifier immédiatement"),
        (Language::Fr, High) => ("ALERTE GLYCÉMIE HAUTE!", "Agir"),
        (Language::Fr, CriticalHigh) => ("ALERTE: GLYCÉMIE TRÈS HAUTE!", "Agir maintenant"),

        (Language::De, CriticalLow) => ("WARNUNG: SEHR NIEDRIG!", "Sofort behandeln"),
        (Language::De, Low) => ("WARNUNG: ZUCKER NIEDRIG!", "Sofort prüfen"),
        (Language::De, High) => ("WARNUNG: ZUCKER HOCH!", "Maßnahmen ergreifen"),
        (Language::De, CriticalHigh) => ("WARNUNG: SEHR HOCH!", "Jetzt handeln"),

        (_, CriticalLow) => ("CRITICAL LOW GLUCOSE!", "Treat now"),
        (_, Low) => ("LOW GLUCOSE ALERT!", "Check immediately"),
        (_, High) => ("HIGH GLUCOSE ALERT!", "Take action"),
        (_, CriticalHigh) => ("CRITICAL HIGH GLUCOSE!", "Act now"),
    };
    Some(text)
}

/// Localized name of a severity band, for spoken summaries
pub fn severity_name(severity: Severity, language: Language) -> &'static str {
    use Severity::*;
    match (language, severity) {
        (Language::Es, CriticalLow) => "muy baja",
        (Language::Es, Low) => "baja",
        (Language::Es, Normal) => "en rango",
        (Language::Es, High) => "alta",
        (Language::Es, CriticalHigh) => "muy alta",
        (Language::Fr, CriticalLow) => "très basse",
        (Language::Fr, Low) => "basse",
        (Language::Fr, Normal) => "dans la cible",
        (Language::Fr, High) => "haute",
        (Language::Fr, CriticalHigh) => "très haute",
        (_, CriticalLow) => "critically low",
        (_, Low) => "low",
        (_, Normal) => "in range",
        (_, High) => "high",
        (_, CriticalHigh) => "critically high",
    }
}

/// One-sentence glucose summary for the voice assistant
pub fn summary_sentence(language: Language, value: &str, unit: &str, trend: &str, status: &str) -> String {
    match language {
        Language::Es => format!("Tu glucosa es {} {} ({}), {}.", value, unit, trend, status),
        Language::Fr => format!("Votre glycémie est de {} {} ({}), {}.", value, unit, trend, status),
        _ => format!("Your glucose is {} {} ({}), {}.", value, unit, trend, status),
    }
}
