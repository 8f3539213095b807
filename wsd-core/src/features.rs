//! # Extração de Colocações
//!
//! Para cada ocorrência da palavra ambígua, extrai as evidências
//! contextuais (colocações) que a lista de decisão usa como features.
//! Cada colocação é uma chave textual determinística derivada de uma
//! janela de offsets fixos ao redor da cabeça.
//!
//! ## Moldes Implementados
//!
//! | Molde            | Offsets          | Chave gerada                     |
//! |------------------|------------------|----------------------------------|
//! | Vizinho direito  | +1               | `"line <w>"`                     |
//! | Vizinho esquerdo | -1               | `"<w> line"`                     |
//! | Janela direita   | +k               | `"<w>"` (sem qualificação)       |
//! | Janela esquerda  | -k               | `"<w>"` (sem qualificação)       |
//! | Bigrama esquerdo | -2, -1           | `"<w1> <w2> line"`               |
//! | Bigrama direito  | +1, +2           | `"line <w1> <w2>"`               |
//! | Bigrama em volta | -1, +1           | `"<w1> line <w2>"`               |
//!
//! As chaves de janela (±k) são o token puro, sem qualificação de molde:
//! chaves iguais vindas de lados diferentes COLIDEM de propósito, como na
//! técnica estatística reproduzida.
//!
//! ## Política de Bordas
//!
//! Omissão: um molde cujo offset cai fora da sequência é simplesmente
//! pulado, no treino e na inferência. A variante alternativa (grampear o
//! offset ao índice válido mais próximo) NÃO é intercambiável com esta e
//! não é implementada.

use serde::{Deserialize, Serialize};

use crate::config::WsdConfig;

/// Os sete moldes de colocação, na ordem de avaliação.
///
/// A ordem é observável: empates de pontuação na inferência são resolvidos
/// em favor do molde avaliado primeiro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureTemplate {
    /// Token imediatamente à direita da cabeça (+1).
    RightOne,
    /// Token imediatamente à esquerda da cabeça (-1).
    LeftOne,
    /// Token na fronteira +k da janela.
    RightWindow,
    /// Token na fronteira -k da janela.
    LeftWindow,
    /// Tokens -2 e -1 seguidos da palavra-alvo.
    LeftBigram,
    /// Palavra-alvo seguida dos tokens +1 e +2.
    RightBigram,
    /// Tokens -1 e +1 com a palavra-alvo no meio.
    Straddling,
}

impl FeatureTemplate {
    /// Nome curto do molde (para serialização e eventos do pipeline).
    pub fn name(&self) -> &'static str {
        match self {
            FeatureTemplate::RightOne => "right_one",
            FeatureTemplate::LeftOne => "left_one",
            FeatureTemplate::RightWindow => "right_window",
            FeatureTemplate::LeftWindow => "left_window",
            FeatureTemplate::LeftBigram => "left_bigram",
            FeatureTemplate::RightBigram => "right_bigram",
            FeatureTemplate::Straddling => "straddling",
        }
    }
}

/// Uma colocação extraída: o molde que a gerou e a chave de consulta.
///
/// Apenas `key` participa da consulta à lista de decisão; `template` existe
/// para explicar de onde a evidência veio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collocation {
    pub template: FeatureTemplate,
    pub key: String,
}

/// Extrai as colocações de uma ocorrência da palavra ambígua.
///
/// Função pura: depende apenas da sequência de tokens (já normalizada pelo
/// [`crate::tokenizer`]), da posição da cabeça e da configuração. Os tokens
/// devem ter sido normalizados de forma idêntica no treino e na inferência,
/// senão as chaves deixam de casar silenciosamente.
///
/// A chave usa `config.target` literal (ex: "line"), não o token encontrado
/// na posição da cabeça.
pub fn extract_collocations(
    tokens: &[String],
    head_index: usize,
    config: &WsdConfig,
) -> Vec<Collocation> {
    let mut collocations = Vec::with_capacity(7);
    let target = config.target.as_str();
    let k = config.window;
    let len = tokens.len();

    // 1. Vizinho imediato à direita
    if head_index + 1 < len {
        collocations.push(Collocation {
            template: FeatureTemplate::RightOne,
            key: format!("{} {}", target, tokens[head_index + 1]),
        });
    }
    // 2. Vizinho imediato à esquerda
    if head_index >= 1 {
        collocations.push(Collocation {
            template: FeatureTemplate::LeftOne,
            key: format!("{} {}", tokens[head_index - 1], target),
        });
    }
    // 3a. Fronteira +k da janela (chave sem qualificação)
    if head_index + k < len {
        collocations.push(Collocation {
            template: FeatureTemplate::RightWindow,
            key: tokens[head_index + k].clone(),
        });
    }
    // 3b. Fronteira -k da janela (chave sem qualificação)
    if head_index >= k {
        collocations.push(Collocation {
            template: FeatureTemplate::LeftWindow,
            key: tokens[head_index - k].clone(),
        });
    }
    // 4. Bigrama à esquerda (-2, -1)
    if head_index >= 2 {
        collocations.push(Collocation {
            template: FeatureTemplate::LeftBigram,
            key: format!(
                "{} {} {}",
                tokens[head_index - 2],
                tokens[head_index - 1],
                target
            ),
        });
    }
    // 5. Bigrama à direita (+1, +2)
    if head_index + 2 < len {
        collocations.push(Collocation {
            template: FeatureTemplate::RightBigram,
            key: format!(
                "{} {} {}",
                target,
                tokens[head_index + 1],
                tokens[head_index + 2]
            ),
        });
    }
    // 6. Bigrama em volta (-1, +1)
    if head_index + 1 < len && head_index >= 1 {
        collocations.push(Collocation {
            template: FeatureTemplate::Straddling,
            key: format!(
                "{} {} {}",
                tokens[head_index - 1],
                target,
                tokens[head_index + 1]
            ),
        });
    }

    collocations
}
