//! # Lista de Decisão por Razão de Log-Verossimilhança
//!
//! O modelo supervisionado no estilo Yarowsky: cada colocação observada no
//! treino vira uma entrada com o sentido dominante e uma pontuação de
//! confiança, e a inferência escolhe a entrada de maior pontuação entre as
//! colocações presentes na instância.
//!
//! ## Treinamento
//!
//! 1. **Contagem** ([`FeatureStats`]): para cada instância rotulada, cada
//!    colocação extraída incrementa a contagem do sentido da instância sob
//!    aquela chave, o total da chave e o total global do sentido.
//! 2. **Pontuação** ([`DecisionList::from_stats`]): para cada chave,
//!    calcula-se `P(s | chave) = count(s, chave) / total(chave)` para cada
//!    sentido do inventário e a pontuação é
//!    `abs(log10((p1 + alpha) / (p2 + alpha)))`, sendo `p1` e `p2` as duas
//!    maiores probabilidades. Com dois sentidos isso reduz exatamente à
//!    razão clássica `P(phone|c)` vs `P(product|c)`.
//!
//! A suavização `alpha` evita divisão por zero quando um sentido nunca
//! co-ocorre com a colocação. As estruturas são construídas uma única vez
//! por treino e imutáveis depois disso; a lista pronta pode ser
//! compartilhada entre threads sem sincronização.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::WsdConfig;
use crate::corpus::Instance;
use crate::error::{WsdError, WsdResult};
use crate::features::extract_collocations;

/// Contagens brutas acumuladas durante o treino.
///
/// Construtor mutável de posse exclusiva do treinamento: uma passada
/// sequencial pelo corpus, sem mutação concorrente, finalizada em uma
/// [`DecisionList`] imutável.
#[derive(Debug, Default)]
pub struct FeatureStats {
    /// chave de colocação → (sentido → ocorrências)
    counts: HashMap<String, BTreeMap<String, u32>>,
    /// chave de colocação → total de ocorrências
    totals: HashMap<String, u32>,
    /// sentido → total de instâncias de treino (alimenta o prior)
    sense_totals: BTreeMap<String, u32>,
}

impl FeatureStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra uma co-ocorrência (colocação, sentido).
    pub fn observe(&mut self, key: &str, sense: &str) {
        *self
            .counts
            .entry(key.to_string())
            .or_default()
            .entry(sense.to_string())
            .or_insert(0) += 1;
        *self.totals.entry(key.to_string()).or_insert(0) += 1;
    }

    /// Registra uma instância de treino com o sentido dado.
    pub fn observe_sense(&mut self, sense: &str) {
        *self.sense_totals.entry(sense.to_string()).or_insert(0) += 1;
    }

    /// Acumula as contagens de um corpus de treino inteiro.
    ///
    /// # Erros
    /// - [`WsdError::EmptyTrainingSet`] para corpus vazio (o sentido
    ///   majoritário ficaria indefinido).
    /// - [`WsdError::UnlabeledInstance`] para instância sem rótulo.
    pub fn from_instances(instances: &[Instance], config: &WsdConfig) -> WsdResult<Self> {
        if instances.is_empty() {
            return Err(WsdError::EmptyTrainingSet);
        }

        let mut stats = FeatureStats::new();
        for instance in instances {
            let sense = instance
                .sense
                .as_deref()
                .ok_or_else(|| WsdError::UnlabeledInstance {
                    id: instance.id.clone(),
                })?;

            for collocation in
                extract_collocations(&instance.tokens, instance.head_index, config)
            {
                stats.observe(&collocation.key, sense);
            }
            stats.observe_sense(sense);
        }
        Ok(stats)
    }

    /// Inventário de sentidos observados no treino, com o sentido padrão
    /// primeiro e os demais em ordem lexicográfica.
    ///
    /// A ordem importa: a ordenação estável por probabilidade em
    /// [`DecisionList::from_stats`] preserva esta ordem entre empatados, o
    /// que implementa a política de desempate (padrão, depois
    /// lexicográfico).
    fn sense_inventory<'a>(&'a self, default_sense: &'a str) -> Vec<&'a str> {
        let mut inventory: Vec<&str> = Vec::with_capacity(self.sense_totals.len());
        if self.sense_totals.contains_key(default_sense) {
            inventory.push(default_sense);
        }
        for sense in self.sense_totals.keys() {
            if sense != default_sense {
                inventory.push(sense);
            }
        }
        inventory
    }

    /// Totais globais por sentido (base do [`SensePrior`]).
    pub fn sense_totals(&self) -> &BTreeMap<String, u32> {
        &self.sense_totals
    }
}

/// Uma entrada da lista de decisão: o veredito de uma colocação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Sentido previsto (o de maior probabilidade suavizada).
    pub sense: String,
    /// Razão de log-verossimilhança, sempre >= 0.
    pub score: f64,
    /// Distribuição bruta sentido → contagem (mantida para o relatório).
    pub counts: BTreeMap<String, u32>,
}

/// A lista de decisão finalizada: chave de colocação → [`Evidence`].
///
/// Imutável após a construção; a consulta é O(1) e livre de estado, então
/// inferências concorrentes podem compartilhar a mesma lista.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionList {
    entries: HashMap<String, Evidence>,
}

impl DecisionList {
    /// Finaliza as contagens em uma lista de decisão pontuada.
    ///
    /// Para cada chave o sentido previsto é o de maior probabilidade
    /// suavizada; empates vão para o sentido padrão da configuração (ou o
    /// lexicograficamente menor entre os empatados, se o padrão não estiver
    /// entre eles).
    pub fn from_stats(stats: &FeatureStats, config: &WsdConfig) -> Self {
        let inventory = stats.sense_inventory(&config.default_sense);
        let alpha = config.alpha;
        let mut entries = HashMap::with_capacity(stats.counts.len());

        for (key, distribution) in &stats.counts {
            let total = f64::from(stats.totals[key]);

            let mut ranked: Vec<(&str, f64)> = inventory
                .iter()
                .map(|sense| {
                    let count = distribution.get(*sense).copied().unwrap_or(0);
                    (*sense, f64::from(count) / total)
                })
                .collect();
            // Ordenação estável: entre probabilidades iguais vale a ordem
            // do inventário (padrão primeiro, depois lexicográfica)
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            let (best_sense, best_p) = ranked[0];
            // Inventário de um único sentido: o "segundo colocado" tem
            // probabilidade zero antes da suavização
            let runner_p = ranked.get(1).map(|r| r.1).unwrap_or(0.0);
            let score = ((best_p + alpha) / (runner_p + alpha)).log10().abs();

            entries.insert(
                key.clone(),
                Evidence {
                    sense: best_sense.to_string(),
                    score,
                    counts: distribution.clone(),
                },
            );
        }

        Self { entries }
    }

    /// Consulta uma chave de colocação. A ausência NÃO é erro: é o caso
    /// esperado de uma colocação nunca vista no treino.
    pub fn lookup(&self, key: &str) -> Option<&Evidence> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Itera as entradas (ordem interna de hash, não significativa).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Evidence)> {
        self.entries.iter()
    }
}

/// Frequência global dos sentidos no treino; define o sentido majoritário
/// usado como retorno quando nenhuma colocação da instância casa com a
/// lista de decisão.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensePrior {
    counts: BTreeMap<String, u32>,
}

impl SensePrior {
    pub fn from_stats(stats: &FeatureStats) -> Self {
        Self {
            counts: stats.sense_totals().clone(),
        }
    }

    /// O sentido mais frequente no treino. Empates vão para o sentido
    /// padrão, se empatado; senão para o lexicograficamente menor.
    pub fn majority<'a>(&'a self, default_sense: &'a str) -> Option<&'a str> {
        let max = self.counts.values().max()?;
        if self.counts.get(default_sense) == Some(max) {
            return Some(default_sense);
        }
        // BTreeMap itera em ordem lexicográfica: o primeiro máximo é o menor
        self.counts
            .iter()
            .find(|(_, count)| *count == max)
            .map(|(sense, _)| sense.as_str())
    }

    /// Contagens sentido → total de instâncias de treino.
    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str, sense: &str, words: &[&str], head: usize) -> Instance {
        Instance {
            id: id.to_string(),
            tokens: words.iter().map(|w| w.to_string()).collect(),
            head_index: head,
            sense: Some(sense.to_string()),
        }
    }

    #[test]
    fn test_single_instance_score() {
        // Uma instância "phone" com vizinho direito "busy":
        // a chave "line busy" deve pontuar abs(log10((1+0.1)/(0+0.1)))
        let config = WsdConfig::default();
        let instances = vec![instance("i1", "phone", &["line", "busy"], 0)];

        let stats = FeatureStats::from_instances(&instances, &config).unwrap();
        let list = DecisionList::from_stats(&stats, &config);

        let evidence = list.lookup("line busy").unwrap();
        assert_eq!(evidence.sense, "phone");

        let expected = ((1.0_f64 + 0.1) / (0.0 + 0.1)).log10().abs();
        assert!((evidence.score - expected).abs() < 1e-12);
        assert_eq!(evidence.counts.get("phone"), Some(&1));
    }

    #[test]
    fn test_tied_distribution_resolves_to_default_sense() {
        // Duas instâncias com a mesma colocação e sentidos diferentes:
        // distribuição {phone: 1, product: 1}, empate → sentido padrão
        let config = WsdConfig::default();
        let instances = vec![
            instance("i1", "phone", &["line", "busy"], 0),
            instance("i2", "product", &["line", "busy"], 0),
        ];

        let stats = FeatureStats::from_instances(&instances, &config).unwrap();
        let list = DecisionList::from_stats(&stats, &config);

        let evidence = list.lookup("line busy").unwrap();
        assert_eq!(evidence.counts.get("phone"), Some(&1));
        assert_eq!(evidence.counts.get("product"), Some(&1));
        assert_eq!(evidence.sense, "phone");
        // Probabilidades suavizadas idênticas: razão 1, pontuação 0
        assert!(evidence.score.abs() < 1e-12);
    }

    #[test]
    fn test_tie_follows_configured_default() {
        let config = WsdConfig {
            default_sense: "product".to_string(),
            ..WsdConfig::default()
        };
        let instances = vec![
            instance("i1", "phone", &["line", "busy"], 0),
            instance("i2", "product", &["line", "busy"], 0),
        ];

        let stats = FeatureStats::from_instances(&instances, &config).unwrap();
        let list = DecisionList::from_stats(&stats, &config);
        assert_eq!(list.lookup("line busy").unwrap().sense, "product");
    }

    #[test]
    fn test_scores_are_non_negative_and_counts_non_empty() {
        let config = WsdConfig::default();
        let corpus = crate::corpus::demo_corpus();
        let stats = FeatureStats::from_instances(&corpus, &config).unwrap();
        let list = DecisionList::from_stats(&stats, &config);

        assert!(!list.is_empty());
        for (_, evidence) in list.iter() {
            assert!(evidence.score >= 0.0);
            assert!(!evidence.counts.is_empty());
        }
    }

    #[test]
    fn test_majority_prefers_higher_count() {
        let config = WsdConfig::default();
        let instances = vec![
            instance("i1", "product", &["new", "line"], 1),
            instance("i2", "product", &["old", "line"], 1),
            instance("i3", "phone", &["busy", "line"], 1),
        ];
        let stats = FeatureStats::from_instances(&instances, &config).unwrap();
        let prior = SensePrior::from_stats(&stats);
        assert_eq!(prior.majority("phone"), Some("product"));
    }

    #[test]
    fn test_majority_tie_goes_to_default() {
        let config = WsdConfig::default();
        let instances = vec![
            instance("i1", "phone", &["busy", "line"], 1),
            instance("i2", "product", &["new", "line"], 1),
        ];
        let stats = FeatureStats::from_instances(&instances, &config).unwrap();
        let prior = SensePrior::from_stats(&stats);
        assert_eq!(prior.majority("product"), Some("product"));
        assert_eq!(prior.majority("phone"), Some("phone"));
    }

    #[test]
    fn test_empty_training_set_is_fatal() {
        let config = WsdConfig::default();
        let err = FeatureStats::from_instances(&[], &config).unwrap_err();
        assert!(matches!(err, WsdError::EmptyTrainingSet));
    }

    #[test]
    fn test_unlabeled_instance_is_fatal() {
        let config = WsdConfig::default();
        let unlabeled = Instance {
            id: "i9".to_string(),
            tokens: vec!["line".to_string(), "busy".to_string()],
            head_index: 0,
            sense: None,
        };
        let err = FeatureStats::from_instances(&[unlabeled], &config).unwrap_err();
        assert!(matches!(err, WsdError::UnlabeledInstance { id } if id == "i9"));
    }
}
