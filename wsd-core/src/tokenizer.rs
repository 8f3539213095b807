//! # Tokenização e Normalização de Contextos
//!
//! Converte o contexto bruto de uma instância na sequência de tokens usada
//! pela extração de colocações, localizando a posição da palavra-alvo.
//!
//! ## Invariante de Normalização
//!
//! Treino e inferência DEVEM normalizar os tokens de forma idêntica: as
//! chaves de colocação são comparadas por igualdade textual, e qualquer
//! assimetria (caixa, pontuação) faz as chaves deixarem de casar em
//! silêncio. Toda tokenização deste módulo passa por [`normalize_token`].
//!
//! ## Dois caminhos de entrada
//!
//! - [`tokenize_marked`]: contexto do corpus, com a palavra-alvo demarcada
//!   por `<head>...</head>` (separação por espaços em branco).
//! - [`tokenize_raw`]: texto livre sem marcação (ex: colado na interface
//!   web), segmentado por fronteiras de palavra Unicode; a primeira
//!   ocorrência da palavra-alvo vira a posição de cabeça.

use unicode_segmentation::UnicodeSegmentation;

/// Pontuação removida de todo token.
///
/// A remoção vale para qualquer posição dentro do token ("u.s." vira
/// "us").
const STRIPPED: &[char] = &[',', '|', '.', ':', '?'];

/// Normaliza um token removendo a pontuação de [`STRIPPED`].
///
/// A caixa é preservada: "AT&T" e "at&t" seguem tokens distintos, e a
/// técnica estatística herda essa distinção.
pub fn normalize_token(raw: &str) -> String {
    raw.chars().filter(|c| !STRIPPED.contains(c)).collect()
}

/// Tokeniza um contexto com a palavra-alvo demarcada por `<head>...</head>`.
///
/// Divide por espaços em branco (o esquema do próprio corpus), normaliza
/// cada token e substitui o token demarcado pelo conteúdo interno da
/// marcação. Retorna a sequência de tokens e o índice da cabeça, ou `None`
/// se nenhum token carregar a marcação.
///
/// Tokens que ficam vazios após a normalização são PRESERVADOS na
/// sequência: removê-los deslocaria as posições ±k e mudaria quais
/// colocações de janela são geradas.
pub fn tokenize_marked(context: &str) -> Option<(Vec<String>, usize)> {
    let mut tokens = Vec::new();
    let mut head_index = None;

    for word in context.split_whitespace() {
        if let Some(inner) = extract_head(word) {
            head_index = Some(tokens.len());
            tokens.push(normalize_token(inner));
        } else {
            tokens.push(normalize_token(word));
        }
    }

    head_index.map(|i| (tokens, i))
}

/// Tokeniza texto livre, sem marcação, localizando a palavra-alvo.
///
/// Usa segmentação Unicode por palavras (que já descarta a pontuação) e
/// toma a PRIMEIRA ocorrência da palavra-alvo, comparada sem distinção de
/// caixa, como cabeça. Retorna `None` se a palavra-alvo não aparecer.
pub fn tokenize_raw(text: &str, target: &str) -> Option<(Vec<String>, usize)> {
    let tokens: Vec<String> = text
        .unicode_words()
        .map(normalize_token)
        .collect();

    let head_index = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case(target))?;

    Some((tokens, head_index))
}

/// Extrai o conteúdo entre `<head>` e `</head>` de um token, se presente.
///
/// Tolera pontuação colada à marcação (ex: `"<head>line</head>."`).
fn extract_head(word: &str) -> Option<&str> {
    let start = word.find("<head>")? + "<head>".len();
    let end = word.find("</head>")?;
    word.get(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize_token("busy,"), "busy");
        assert_eq!(normalize_token("u.s."), "us");
        assert_eq!(normalize_token("growth?"), "growth");
        assert_eq!(normalize_token("access"), "access");
    }

    #[test]
    fn test_normalize_preserves_case() {
        assert_eq!(normalize_token("AT&T"), "AT&T");
    }

    #[test]
    fn test_tokenize_marked_locates_head() {
        let (tokens, head) =
            tokenize_marked("the <head>line</head> went dead").unwrap();
        assert_eq!(tokens, vec!["the", "line", "went", "dead"]);
        assert_eq!(head, 1);
    }

    #[test]
    fn test_tokenize_marked_with_attached_punctuation() {
        let (tokens, head) = tokenize_marked("a busy <head>line</head>.").unwrap();
        assert_eq!(tokens[head], "line");
        assert_eq!(head, 2);
    }

    #[test]
    fn test_tokenize_marked_without_head() {
        assert!(tokenize_marked("no target word here").is_none());
    }

    #[test]
    fn test_empty_tokens_keep_positions() {
        // "..." normaliza para vazio mas a posição da janela não muda
        let (tokens, head) = tokenize_marked("wait ... the <head>line</head>").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], "");
        assert_eq!(head, 3);
    }

    #[test]
    fn test_tokenize_raw_first_occurrence() {
        let (tokens, head) = tokenize_raw("the line, a new line", "line").unwrap();
        assert_eq!(head, 1);
        assert_eq!(tokens[head], "line");
    }

    #[test]
    fn test_tokenize_raw_missing_target() {
        assert!(tokenize_raw("nothing to see", "line").is_none());
    }
}
