/// Utilitários de texto usados pelo quadro de visitas

/// Busca case-insensitive (Unicode) de `needle` em `haystack`
///
/// Agulha vazia casa com tudo.
///
/// # Exemplo
/// ```
/// use backoffice_visitas::utils::string_utils::contains_folded;
///
/// assert!(contains_folded("Construtora AÇÃO", "ação"));
/// assert!(contains_folded("Acme", ""));
/// ```
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Corta o texto em `max_chars` caracteres, sem partir caracteres UTF-8
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Prévia curta para cartões: corta e adiciona "…" quando necessário
pub fn preview(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    let truncated = truncate_chars(s, max_chars);
    if truncated.len() < s.len() {
        format!("{}…", truncated.trim_end())
    } else {
        truncated.to_string()
    }
}

/// `yyyy-mm-dd` → `dd/mm/yyyy`; valores fora do formato voltam intactos
pub fn format_data_br(data: &str) -> String {
    chrono::NaiveDate::parse_from_str(data, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| data.to_string())
}

/// `HH:MM:SS` → `HH:MM`
pub fn format_hora(hora: &str) -> &str {
    truncate_chars(hora, 5)
}
