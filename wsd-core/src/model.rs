//! # Modelo WSD Treinado
//!
//! O artefato final do treinamento: a [`DecisionList`] pontuada, o
//! [`SensePrior`] para o retorno majoritário e a configuração usada no
//! treino (janela, alvo, suavização), tudo junto para que a inferência
//! nunca misture parâmetros de treinos diferentes.
//!
//! ## Inferência
//!
//! Para cada instância, extrai as colocações na ordem dos moldes, consulta
//! cada chave na lista e escolhe a evidência de MAIOR pontuação; empates
//! ficam com a evidência avaliada primeiro (substituição apenas por
//! pontuação estritamente maior). Sem nenhuma evidência, vale o sentido
//! majoritário do treino.
//!
//! ## Persistência
//!
//! Dois formatos: JSON estruturado (ida-e-volta exata, via serde) e um
//! relatório de texto legível, um registro por colocação com a pontuação,
//! o sentido previsto e a distribuição bruta.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::config::WsdConfig;
use crate::corpus::Instance;
use crate::decision_list::{DecisionList, Evidence, FeatureStats, SensePrior};
use crate::error::WsdResult;
use crate::features::{extract_collocations, FeatureTemplate};

/// Uma colocação da instância que casou com a lista de decisão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceMatch {
    pub template: FeatureTemplate,
    pub key: String,
    pub sense: String,
    pub score: f64,
}

/// Resultado da inferência sobre uma instância.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Sentido escolhido.
    pub sense: String,
    /// Todas as evidências que casaram, na ordem de avaliação dos moldes.
    pub matches: Vec<EvidenceMatch>,
    /// `true` quando nenhuma colocação casou e o sentido veio do prior.
    pub fallback: bool,
}

/// Uma resposta rotulada: identificador da instância e sentido previsto.
///
/// O par (id, sentido) é o contrato do núcleo; a renderização
/// `<answer .../>` existe para interoperar com o avaliador externo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub instance_id: String,
    pub sense: String,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<answer instance="{}" senseid="{}"/>"#,
            self.instance_id, self.sense
        )
    }
}

/// O modelo de desambiguação completo, imutável após o treino.
///
/// Pode ser compartilhado entre threads sem sincronização: a inferência só
/// lê. A recriação é sempre do zero (sem atualização incremental).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsdModel {
    config: WsdConfig,
    decision_list: DecisionList,
    prior: SensePrior,
}

impl WsdModel {
    /// Treina um modelo a partir de instâncias rotuladas.
    ///
    /// Passada única e sequencial: contagens ([`FeatureStats`]) e depois a
    /// finalização na lista pontuada. Corpus vazio ou instância sem rótulo
    /// são erros fatais.
    pub fn train(instances: &[Instance], config: WsdConfig) -> WsdResult<Self> {
        let stats = FeatureStats::from_instances(instances, &config)?;
        let decision_list = DecisionList::from_stats(&stats, &config);
        let prior = SensePrior::from_stats(&stats);

        Ok(Self {
            config,
            decision_list,
            prior,
        })
    }

    pub fn config(&self) -> &WsdConfig {
        &self.config
    }

    pub fn decision_list(&self) -> &DecisionList {
        &self.decision_list
    }

    pub fn prior(&self) -> &SensePrior {
        &self.prior
    }

    /// O sentido majoritário do treino (retorno quando nada casa).
    pub fn majority_sense(&self) -> &str {
        self.prior
            .majority(&self.config.default_sense)
            .unwrap_or(&self.config.default_sense)
    }

    /// Inferência sobre uma sequência de tokens já normalizada.
    ///
    /// Função pura: duas chamadas com a mesma entrada produzem o mesmo
    /// resultado.
    pub fn predict_tokens(&self, tokens: &[String], head_index: usize) -> Prediction {
        let collocations = extract_collocations(tokens, head_index, &self.config);

        let mut matches = Vec::new();
        for collocation in collocations {
            if let Some(evidence) = self.decision_list.lookup(&collocation.key) {
                matches.push(EvidenceMatch {
                    template: collocation.template,
                    key: collocation.key,
                    sense: evidence.sense.clone(),
                    score: evidence.score,
                });
            }
        }

        // Maior pontuação vence; empate fica com o molde avaliado primeiro
        // (troca apenas quando estritamente maior)
        let mut best: Option<&EvidenceMatch> = None;
        for m in &matches {
            if best.map(|b| m.score > b.score).unwrap_or(true) {
                best = Some(m);
            }
        }

        match best {
            Some(evidence) => Prediction {
                sense: evidence.sense.clone(),
                fallback: false,
                matches: matches.clone(),
            },
            None => Prediction {
                sense: self.majority_sense().to_string(),
                fallback: true,
                matches,
            },
        }
    }

    /// Inferência sobre uma instância do corpus.
    pub fn predict(&self, instance: &Instance) -> Prediction {
        self.predict_tokens(&instance.tokens, instance.head_index)
    }

    /// Rotula uma instância, preservando o identificador para a avaliação.
    pub fn label(&self, instance: &Instance) -> Answer {
        Answer {
            instance_id: instance.id.clone(),
            sense: self.predict(instance).sense,
        }
    }

    /// Rotula um lote de instâncias em paralelo, preservando a ordem.
    ///
    /// As instâncias são independentes entre si e o modelo é somente
    /// leitura, então o lote distribui direto nos workers do rayon.
    pub fn label_all(&self, instances: &[Instance]) -> Vec<Answer> {
        instances.par_iter().map(|i| self.label(i)).collect()
    }

    /// Serializa o modelo como JSON estruturado.
    pub fn to_json(&self) -> WsdResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reconstrói um modelo a partir do JSON de [`WsdModel::to_json`].
    ///
    /// A ida-e-volta reproduz exatamente as mesmas predições do modelo em
    /// memória.
    pub fn from_json(json: &str) -> WsdResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Grava o artefato JSON em disco com escrita atômica
    /// (arquivo temporário + rename).
    pub fn save(&self, path: &Path) -> WsdResult<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(&temp);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Carrega um artefato gravado por [`WsdModel::save`].
    pub fn load(path: &Path) -> WsdResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Relatório legível da lista de decisão, um registro por colocação,
    /// em ordem decrescente de pontuação (a ordem é só usabilidade, nunca
    /// semântica).
    pub fn report(&self) -> String {
        let mut entries: Vec<(&String, &Evidence)> = self.decision_list.iter().collect();
        entries.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let mut report = String::new();
        for (key, evidence) in entries {
            let frequencies: Vec<String> = evidence
                .counts
                .iter()
                .map(|(sense, count)| format!("{}: {}", sense, count))
                .collect();
            report.push_str(&format!(
                "Collocation: {}, Log-Likelihood Ratio: {}, Predicts Sense: {}, Frequencies: {{{}}}\n",
                key,
                evidence.score,
                evidence.sense,
                frequencies.join(", ")
            ));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::demo_corpus;

    fn trained_demo_model() -> WsdModel {
        WsdModel::train(&demo_corpus(), WsdConfig::default()).unwrap()
    }

    fn unlabeled(id: &str, words: &[&str], head: usize) -> Instance {
        Instance {
            id: id.to_string(),
            tokens: words.iter().map(|w| w.to_string()).collect(),
            head_index: head,
            sense: None,
        }
    }

    #[test]
    fn test_predict_uses_highest_scoring_evidence() {
        let model = trained_demo_model();
        // "line was busy" aparece só em contextos "phone" no corpus demo
        let instance = unlabeled("t1", &["the", "line", "was", "busy"], 1);
        let prediction = model.predict(&instance);
        assert_eq!(prediction.sense, "phone");
        assert!(!prediction.fallback);
        assert!(!prediction.matches.is_empty());
    }

    #[test]
    fn test_unseen_context_falls_back_to_majority() {
        let model = trained_demo_model();
        // Nenhum token compartilhado com o vocabulário de treino
        let instance = unlabeled("t2", &["zzz", "line", "qqq"], 1);
        let prediction = model.predict(&instance);
        assert!(prediction.fallback);
        assert!(prediction.matches.is_empty());
        assert_eq!(prediction.sense, model.majority_sense());
    }

    #[test]
    fn test_majority_sense_matches_prior_counts() {
        let model = trained_demo_model();
        let counts = model.prior().counts();
        let majority = model.majority_sense();
        let max = counts.values().max().copied().unwrap();
        assert_eq!(counts.get(majority).copied(), Some(max));
    }

    #[test]
    fn test_inference_is_idempotent() {
        let model = trained_demo_model();
        let instance = unlabeled("t3", &["a", "new", "line", "of", "shoes"], 2);
        let first = model.predict(&instance);
        let second = model.predict(&instance);
        assert_eq!(first, second);
    }

    #[test]
    fn test_label_all_preserves_order_and_ids() {
        let model = trained_demo_model();
        let batch = vec![
            unlabeled("a", &["busy", "line"], 1),
            unlabeled("b", &["line", "of", "clothing"], 0),
            unlabeled("c", &["zzz", "line"], 1),
        ];
        let answers = model.label_all(&batch);
        let ids: Vec<&str> = answers.iter().map(|a| a.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_batch_is_a_noop() {
        let model = trained_demo_model();
        assert!(model.label_all(&[]).is_empty());
    }

    #[test]
    fn test_json_round_trip_reproduces_predictions() {
        let model = trained_demo_model();
        let restored = WsdModel::from_json(&model.to_json().unwrap()).unwrap();

        for instance in demo_corpus() {
            let probe = Instance {
                sense: None,
                ..instance
            };
            assert_eq!(model.predict(&probe), restored.predict(&probe));
        }
    }

    #[test]
    fn test_save_and_load() {
        let model = trained_demo_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line-model.json");

        model.save(&path).unwrap();
        let loaded = WsdModel::load(&path).unwrap();

        let instance = unlabeled("t4", &["the", "line", "was", "busy"], 1);
        assert_eq!(model.predict(&instance), loaded.predict(&instance));
    }

    #[test]
    fn test_answer_display_format() {
        let answer = Answer {
            instance_id: "line-n.w8_059:8174:".to_string(),
            sense: "phone".to_string(),
        };
        assert_eq!(
            answer.to_string(),
            r#"<answer instance="line-n.w8_059:8174:" senseid="phone"/>"#
        );
    }

    #[test]
    fn test_report_lists_every_feature_once() {
        let model = trained_demo_model();
        let report = model.report();
        assert_eq!(report.lines().count(), model.decision_list().len());
        assert!(report.contains("Predicts Sense:"));
        // Ordem decrescente de pontuação
        let scores: Vec<f64> = report
            .lines()
            .map(|line| {
                line.split("Log-Likelihood Ratio: ")
                    .nth(1)
                    .and_then(|rest| rest.split(',').next())
                    .and_then(|s| s.parse().ok())
                    .unwrap()
            })
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
