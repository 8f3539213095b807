//! # Avaliação: Acurácia e Matriz de Confusão
//!
//! O colaborador de avaliação do sistema: compara duas sequências paralelas
//! de sentidos (previsto e gabarito) e produz acurácia mais a matriz de
//! confusão gabarito × previsto. Função pura sobre duas sequências de
//! mesmo tamanho; divergência de tamanho é erro fatal (nunca truncar).
//!
//! Também sabe extrair os sentidos de um fluxo de linhas
//! `<answer ... senseid="..."/>`, para que a saída renderizada do modelo
//! feche o ciclo com o avaliador.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{WsdError, WsdResult};

/// Resultado da avaliação.
///
/// A matriz de confusão é aninhada (gabarito → previsto → contagem), o
/// equivalente estrutural do mapa chaveado por par (gabarito, previsto).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Proporção de acertos (corretos / total).
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
    /// gabarito → (previsto → contagem)
    pub confusion: BTreeMap<String, BTreeMap<String, usize>>,
}

impl Score {
    /// Contagem de uma célula (gabarito, previsto) da matriz.
    pub fn cell(&self, gold: &str, predicted: &str) -> usize {
        self.confusion
            .get(gold)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }
}

impl fmt::Display for Score {
    /// Renderiza a acurácia e a tabela gabarito (linhas) × previsto
    /// (colunas).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {}", self.accuracy)?;

        // Colunas: união dos sentidos vistos em qualquer eixo, em ordem
        let mut senses: Vec<&str> = self.confusion.keys().map(String::as_str).collect();
        for row in self.confusion.values() {
            for predicted in row.keys() {
                if !senses.contains(&predicted.as_str()) {
                    senses.push(predicted);
                }
            }
        }
        senses.sort_unstable();

        for sense in &senses {
            write!(f, "      {:<8}", sense)?;
        }
        writeln!(f)?;

        for gold in &senses {
            write!(f, "{:<8}", gold)?;
            for predicted in &senses {
                write!(f, " {:<8}", self.cell(gold, predicted))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Compara as respostas previstas com o gabarito.
///
/// # Erros
/// [`WsdError::LengthMismatch`] quando as sequências diferem em tamanho;
/// nada é avaliado parcialmente nesse caso.
pub fn score(predicted: &[String], actual: &[String]) -> WsdResult<Score> {
    if predicted.len() != actual.len() {
        return Err(WsdError::LengthMismatch {
            predicted: predicted.len(),
            actual: actual.len(),
        });
    }

    let mut confusion: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    let mut correct = 0;

    for (prediction, gold) in predicted.iter().zip(actual) {
        *confusion
            .entry(gold.clone())
            .or_default()
            .entry(prediction.clone())
            .or_insert(0) += 1;
        if prediction == gold {
            correct += 1;
        }
    }

    let total = actual.len();
    Ok(Score {
        // total == 0 só acontece com duas sequências vazias; acurácia 0 é
        // o comportamento neutro (nenhum acerto em nenhuma tentativa)
        accuracy: if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        },
        correct,
        total,
        confusion,
    })
}

/// Extrai os sentidos de um fluxo de linhas `<answer ... senseid="..."/>`.
///
/// Para na primeira linha vazia; uma linha não vazia sem `senseid` é erro
/// de formato fatal.
pub fn parse_answer_senses(text: &str) -> WsdResult<Vec<String>> {
    let sense_re = Regex::new(r#"senseid="([^"]+)""#).expect("regex válida");
    let mut senses = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            break;
        }
        let capture = sense_re
            .captures(line)
            .ok_or_else(|| WsdError::MalformedAnswer {
                line: line.to_string(),
            })?;
        senses.push(capture[1].to_string());
    }
    Ok(senses)
}
