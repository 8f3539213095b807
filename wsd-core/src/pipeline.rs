//! # Pipeline de Desambiguação — Orquestrador com Eventos Observáveis
//!
//! Envolve um [`WsdModel`] treinado e executa a inferência emitindo um
//! evento por passo via canal (`mpsc`), permitindo que o servidor
//! WebSocket transmita o "raciocínio" do modelo em tempo real: tokens,
//! colocações extraídas, evidências que casaram com a lista de decisão e a
//! decisão final (ou o retorno majoritário).
//!
//! Os eventos são um recurso de apresentação; o contrato do núcleo continua
//! sendo o par (identificador, sentido) por instância.

use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::config::WsdConfig;
use crate::corpus::{demo_corpus, Instance};
use crate::error::WsdResult;
use crate::features::Collocation;
use crate::model::{Answer, Prediction, WsdModel};
use crate::tokenizer::tokenize_raw;

/// Eventos emitidos pelo pipeline durante a inferência de um contexto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// **Passo 1**: texto segmentado e palavra-alvo localizada.
    TokenizationDone {
        tokens: Vec<String>,
        head_index: usize,
        total: usize,
    },
    /// **Passo 2**: colocações extraídas ao redor da cabeça.
    CollocationsExtracted { collocations: Vec<Collocation> },
    /// **Passo 3 (repetido)**: uma colocação casou com a lista de decisão.
    EvidenceMatched {
        template: String,
        key: String,
        sense: String,
        score: f64,
    },
    /// **Passo 3 (alternativo)**: nada casou; o sentido majoritário entra.
    FallbackUsed { sense: String },
    /// **Passo 4**: sentido final escolhido.
    SenseAssigned {
        sense: String,
        score: Option<f64>,
        source: String, // "decision_list" ou "prior"
    },
    /// **Conclusão**: resultado consolidado e tempo de processamento.
    Done {
        prediction: Prediction,
        processing_ms: u64,
    },
    /// **Falha**: a palavra-alvo não aparece no texto.
    Error { message: String },
}

/// O pipeline de desambiguação.
///
/// # Modos de Uso
/// - **Sync**: [`WsdPipeline::disambiguate`] para chamadas diretas.
/// - **Streaming**: [`WsdPipeline::disambiguate_streaming`] para UIs
///   reativas (via WebSocket).
pub struct WsdPipeline {
    pub model: WsdModel,
}

impl WsdPipeline {
    pub fn new(model: WsdModel) -> Self {
        Self { model }
    }

    /// Treina o pipeline sobre o corpus de demonstração embutido, com a
    /// configuração padrão ("line", k = 30, alpha = 0.1).
    pub fn from_demo_corpus() -> WsdResult<Self> {
        let model = WsdModel::train(&demo_corpus(), WsdConfig::default())?;
        Ok(Self::new(model))
    }

    /// Desambigua um texto livre de forma síncrona.
    ///
    /// Retorna `None` quando a palavra-alvo não aparece no texto.
    pub fn disambiguate(&self, text: &str) -> Option<Prediction> {
        let (tx, rx) = mpsc::channel();
        self.disambiguate_streaming(text, tx);

        let mut result = None;
        while let Ok(event) = rx.recv() {
            if let PipelineEvent::Done { prediction, .. } = event {
                result = Some(prediction);
            }
        }
        result
    }

    /// Executa a inferência emitindo eventos de progresso no canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `CollocationsExtracted`
    /// 3. `EvidenceMatched` (um por casamento) ou `FallbackUsed`
    /// 4. `SenseAssigned`
    /// 5. `Done`
    ///
    /// Texto sem a palavra-alvo emite apenas `Error`.
    pub fn disambiguate_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = std::time::Instant::now();
        let target = &self.model.config().target;

        let Some((tokens, head_index)) = tokenize_raw(text, target) else {
            let _ = tx.send(PipelineEvent::Error {
                message: format!("o texto não contém a palavra-alvo \"{}\"", target),
            });
            return;
        };

        let _ = tx.send(PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            head_index,
            total: tokens.len(),
        });

        let collocations =
            crate::features::extract_collocations(&tokens, head_index, self.model.config());
        let _ = tx.send(PipelineEvent::CollocationsExtracted {
            collocations: collocations.clone(),
        });

        let prediction = self.model.predict_tokens(&tokens, head_index);

        for evidence in &prediction.matches {
            let _ = tx.send(PipelineEvent::EvidenceMatched {
                template: evidence.template.name().to_string(),
                key: evidence.key.clone(),
                sense: evidence.sense.clone(),
                score: evidence.score,
            });
        }

        if prediction.fallback {
            let _ = tx.send(PipelineEvent::FallbackUsed {
                sense: prediction.sense.clone(),
            });
        }

        let best_score = prediction
            .matches
            .iter()
            .map(|m| m.score)
            .fold(None, |best: Option<f64>, s| {
                Some(best.map_or(s, |b| b.max(s)))
            });
        let _ = tx.send(PipelineEvent::SenseAssigned {
            sense: prediction.sense.clone(),
            score: best_score,
            source: if prediction.fallback {
                "prior".to_string()
            } else {
                "decision_list".to_string()
            },
        });

        let _ = tx.send(PipelineEvent::Done {
            prediction,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    /// Rotula um lote de instâncias de teste (delegando ao modelo, que
    /// paraleliza por instância).
    pub fn label_corpus(&self, instances: &[Instance]) -> Vec<Answer> {
        self.model.label_all(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_event_sequence() {
        let pipeline = WsdPipeline::from_demo_corpus().unwrap();
        let (tx, rx) = mpsc::channel();
        pipeline.disambiguate_streaming("the line was busy all day", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(!events.is_empty());
        assert!(
            matches!(&events[0], PipelineEvent::TokenizationDone { .. }),
            "primeiro evento deve ser TokenizationDone"
        );
        assert!(
            matches!(events.last().unwrap(), PipelineEvent::Done { .. }),
            "último evento deve ser Done"
        );
    }

    #[test]
    fn test_pipeline_without_target_emits_error() {
        let pipeline = WsdPipeline::from_demo_corpus().unwrap();
        let (tx, rx) = mpsc::channel();
        pipeline.disambiguate_streaming("no ambiguous word here", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], PipelineEvent::Error { .. }));
    }

    #[test]
    fn test_sync_matches_streaming() {
        let pipeline = WsdPipeline::from_demo_corpus().unwrap();
        let prediction = pipeline
            .disambiguate("the operator said the line was busy")
            .unwrap();
        assert_eq!(prediction.sense, "phone");
    }

    #[test]
    fn test_fallback_event_for_unseen_context() {
        let pipeline = WsdPipeline::from_demo_corpus().unwrap();
        let (tx, rx) = mpsc::channel();
        pipeline.disambiguate_streaming("zzz line qqq", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::FallbackUsed { .. })));
    }

    #[test]
    fn test_label_corpus_preserves_ids() {
        let pipeline = WsdPipeline::from_demo_corpus().unwrap();
        let corpus = demo_corpus();
        let answers = pipeline.label_corpus(&corpus);
        assert_eq!(answers.len(), corpus.len());
        assert_eq!(answers[0].instance_id, corpus[0].id);
    }
}
