//! # wsd-core — Desambiguação de Sentido de Palavras com Listas de Decisão
//!
//! Este crate implementa o algoritmo clássico de Yarowsky para
//! desambiguação supervisionada de uma palavra ambígua (aqui, "line", com
//! os sentidos "phone" e "product"). Ele foi projetado para ser didático,
//! modular e observável passo a passo.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui e é transformado em estágios:
//!
//! 1.  **Entrada**: corpus pseudo-SGML ou texto livre (String).
//! 2.  **Tokenização** ([`tokenizer`]): contexto dividido em tokens
//!     normalizados, com a posição da palavra-alvo localizada.
//! 3.  **Extração de Colocações** ([`features`]): sete moldes de janela
//!     fixa ao redor da cabeça (vizinhos ±1, fronteiras ±k, bigramas).
//! 4.  **Lista de Decisão** ([`decision_list`]): contagens por colocação
//!     viram pontuações de razão de log-verossimilhança; a inferência
//!     escolhe a evidência de maior pontuação, com retorno ao sentido
//!     majoritário quando nada casa.
//! 5.  **Saída**: um [`model::Answer`] (identificador, sentido) por
//!     instância, avaliável pelo [`scorer`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use wsd_core::corpus::demo_corpus;
//! use wsd_core::{WsdConfig, WsdModel, WsdPipeline};
//!
//! // 1. Treina sobre o corpus de demonstração embutido
//! let model = WsdModel::train(&demo_corpus(), WsdConfig::default()).unwrap();
//!
//! // 2. Desambigua um texto livre
//! let pipeline = WsdPipeline::new(model);
//! let prediction = pipeline
//!     .disambiguate("the line was busy when i called")
//!     .unwrap();
//!
//! assert_eq!(prediction.sense, "phone");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador com eventos observáveis (base da UI web).
//! - [`corpus`]: leitura do corpus e dados de demonstração embutidos.
//! - [`features`]: os sete moldes de colocação.
//! - [`model`]: o artefato treinado, inferência e persistência.
//! - [`scorer`]: acurácia e matriz de confusão.

pub mod config;
pub mod corpus;
pub mod decision_list;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod scorer;
pub mod tokenizer;

pub use config::WsdConfig;
pub use decision_list::{DecisionList, Evidence, FeatureStats, SensePrior};
pub use error::{WsdError, WsdResult};
pub use features::{Collocation, FeatureTemplate};
pub use model::{Answer, Prediction, WsdModel};
pub use pipeline::{PipelineEvent, WsdPipeline};
pub use scorer::{score, Score};
