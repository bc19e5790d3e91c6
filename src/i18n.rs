//! User-visible strings.
//!
//! Every string a viewer or administrator reads comes from a [`Messages`]
//! table selected by [`Locale`]. Spanish is the default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

#[derive(Debug)]
pub struct Messages {
    pub lang: &'static str,
    pub player_title: &'static str,
    pub not_configured: &'static str,
    pub invalid_url: &'static str,
    pub settings_hint: &'static str,
    pub configured_url_label: &'static str,
    pub debug_heading: &'static str,
    pub debug_original_url: &'static str,
    pub debug_video_id: &'static str,
    pub debug_embed_url: &'static str,
    pub admin_title: &'static str,
    pub admin_url_label: &'static str,
    pub admin_url_placeholder: &'static str,
    pub admin_url_description: &'static str,
    pub admin_submit: &'static str,
    pub admin_saved: &'static str,
    pub admin_rejected: &'static str,
    pub admin_usage_heading: &'static str,
    pub admin_usage_text: &'static str,
}

static ES: Messages = Messages {
    lang: "es",
    player_title: "Asamblea General de Condominio en Vivo",
    not_configured: "Por favor, configure la URL de YouTube en el panel de administración.",
    invalid_url: "Error: La URL de YouTube no es válida. Por favor, verifique la configuración.",
    settings_hint: "Configuración → Asamblea en Vivo",
    configured_url_label: "URL configurada",
    debug_heading: "Debug Info",
    debug_original_url: "URL Original",
    debug_video_id: "YouTube ID",
    debug_embed_url: "Embed URL",
    admin_title: "Asamblea en Vivo - Configuración",
    admin_url_label: "URL de YouTube",
    admin_url_placeholder: "https://www.youtube.com/watch?v=VIDEO_ID o https://youtu.be/VIDEO_ID",
    admin_url_description: "Ingrese la URL completa de la transmisión en vivo de YouTube. \
        Puede ser un video normal o una transmisión en vivo.",
    admin_submit: "Guardar configuración",
    admin_saved: "Configuración guardada correctamente.",
    admin_rejected: "La URL no fue aceptada",
    admin_usage_heading: "Uso del Shortcode",
    admin_usage_text: "Para mostrar el reproductor de YouTube en cualquier página, use el siguiente shortcode:",
};

static EN: Messages = Messages {
    lang: "en",
    player_title: "Live Condominium General Assembly",
    not_configured: "Please configure the YouTube URL in the administration panel.",
    invalid_url: "Error: The YouTube URL is not valid. Please check the settings.",
    settings_hint: "Settings → Live Assembly",
    configured_url_label: "Configured URL",
    debug_heading: "Debug Info",
    debug_original_url: "Original URL",
    debug_video_id: "YouTube ID",
    debug_embed_url: "Embed URL",
    admin_title: "Live Assembly - Settings",
    admin_url_label: "YouTube URL",
    admin_url_placeholder: "https://www.youtube.com/watch?v=VIDEO_ID or https://youtu.be/VIDEO_ID",
    admin_url_description: "Enter the full URL of the YouTube live stream. \
        It can be a regular video or a live stream.",
    admin_submit: "Save settings",
    admin_saved: "Settings saved.",
    admin_rejected: "The URL was not accepted",
    admin_usage_heading: "Shortcode usage",
    admin_usage_text: "To show the YouTube player on any page, use the following shortcode:",
};

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::Es => &ES,
            Locale::En => &EN,
        }
    }
}
