//! # Corpus de Instâncias da Palavra Ambígua
//!
//! Modela uma ocorrência da palavra-alvo em contexto ([`Instance`]) e faz a
//! leitura do formato pseudo-SGML do corpus "line" (instâncias demarcadas
//! por `<instance id="...">`, rótulo em `<answer ... senseid="..."/>` e
//! contexto com a cabeça em `<head>...</head>`).
//!
//! O formato carrega marcação estrutural extra (`<@>`, `<p>`, `<s>`) que
//! não interessa à extração de colocações; [`clean_markup`] remove essa
//! camada antes do parse.
//!
//! Também embute um corpus de demonstração rotulado à mão (sentidos
//! "phone" e "product") para testes, para a interface web e para avaliação
//! rápida sem arquivos externos.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{WsdError, WsdResult};
use crate::tokenizer::tokenize_marked;

/// Uma ocorrência da palavra ambígua em contexto.
///
/// Os tokens já estão normalizados (ver [`crate::tokenizer`]); `head_index`
/// aponta a posição da palavra-alvo dentro de `tokens`. O rótulo `sense`
/// está presente apenas em dados de treino e no gabarito.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Identificador único (ex: `"line-n.w8_059:8174:"`).
    pub id: String,
    /// Sequência de tokens do contexto, normalizada.
    pub tokens: Vec<String>,
    /// Posição da palavra-alvo em `tokens`.
    pub head_index: usize,
    /// Rótulo de sentido (presente só em treino/gabarito).
    pub sense: Option<String>,
}

/// Papel do corpus sendo lido: treino exige rótulo, teste o ignora.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusKind {
    /// Toda instância precisa de `senseid`; a ausência é erro fatal.
    Training,
    /// Rótulos são ignorados se presentes.
    Test,
}

/// Remove a marcação estrutural que envolve os contextos.
///
/// Descarta `<@>`, `<p>`, `</p>`, `<s>`, `</s>` e colapsa sequências de
/// espaços.
pub fn clean_markup(text: &str) -> String {
    let structural = Regex::new(r"(<@>|</p>|<p>|<s>|</s>)").expect("regex válida");
    let spaces = Regex::new(r" +").expect("regex válida");

    let stripped = structural.replace_all(text, "");
    spaces.replace_all(&stripped, " ").into_owned()
}

/// Lê um corpus pseudo-SGML completo, produzindo as instâncias na ordem do
/// arquivo.
///
/// # Erros
/// - [`WsdError::MalformedInstance`]: instância sem contexto ou sem a
///   cabeça demarcada, ou blocos `<instance` que o parser não reconhece.
/// - [`WsdError::UnlabeledInstance`]: instância sem `senseid` quando
///   `kind` é [`CorpusKind::Training`].
///
/// Qualquer erro aborta a leitura inteira: nenhuma saída parcial é
/// produzida.
pub fn parse_corpus(text: &str, kind: CorpusKind) -> WsdResult<Vec<Instance>> {
    let cleaned = clean_markup(text);

    let instance_re =
        Regex::new(r#"(?s)<instance id="([^"]+)"[^>]*>(.*?)</instance>"#).expect("regex válida");
    let answer_re = Regex::new(r#"senseid="([^"]+)""#).expect("regex válida");
    let context_re = Regex::new(r"(?s)<context>(.*?)</context>").expect("regex válida");

    let mut instances = Vec::new();

    for capture in instance_re.captures_iter(&cleaned) {
        let id = capture[1].to_string();
        let body = &capture[2];

        let context = context_re
            .captures(body)
            .map(|c| c[1].to_string())
            .ok_or_else(|| WsdError::MalformedInstance { id: id.clone() })?;

        let (tokens, head_index) = tokenize_marked(&context)
            .ok_or_else(|| WsdError::MalformedInstance { id: id.clone() })?;

        let sense = answer_re.captures(body).map(|c| c[1].to_string());
        if kind == CorpusKind::Training && sense.is_none() {
            return Err(WsdError::UnlabeledInstance { id });
        }

        instances.push(Instance {
            id,
            tokens,
            head_index,
            sense: match kind {
                CorpusKind::Training => sense,
                CorpusKind::Test => None,
            },
        });
    }

    // Blocos <instance que o regex não capturou indicam marcação quebrada
    // (ex: aspas não fechadas no id). Falha antes de devolver saída parcial.
    let opened = cleaned.matches("<instance ").count();
    if opened != instances.len() {
        return Err(WsdError::MalformedInstance {
            id: format!("{} de {} blocos reconhecidos", instances.len(), opened),
        });
    }

    Ok(instances)
}

/// Um contexto rotulado do corpus de demonstração.
pub struct LabeledContext {
    pub id: &'static str,
    pub sense: &'static str,
    /// Contexto com a cabeça demarcada por `<head>...</head>`.
    pub context: &'static str,
}

/// Contextos de demonstração rotulados à mão para a palavra "line".
///
/// Cobrem os dois sentidos clássicos do experimento: "phone" (linha
/// telefônica) e "product" (linha de produtos). Vizinhos imediatos foram
/// escolhidos para serem discriminativos ("busy", "dead", "of clothing"),
/// espelhando as colocações fortes do corpus real.
pub fn demo_contexts() -> &'static [LabeledContext] {
    &[
        // ===== PHONE =====
        LabeledContext {
            id: "line-demo.phone:01:",
            sense: "phone",
            context: "please hold while i transfer your call the <head>line</head> is busy at the moment",
        },
        LabeledContext {
            id: "line-demo.phone:02:",
            sense: "phone",
            context: "the telephone <head>line</head> went dead during the storm last night",
        },
        LabeledContext {
            id: "line-demo.phone:03:",
            sense: "phone",
            context: "customers complained because every access <head>line</head> was busy again",
        },
        LabeledContext {
            id: "line-demo.phone:04:",
            sense: "phone",
            context: "she picked up the receiver but the <head>line</head> was silent",
        },
        LabeledContext {
            id: "line-demo.phone:05:",
            sense: "phone",
            context: "engineers repaired the damaged phone <head>line</head> after the flood",
        },
        LabeledContext {
            id: "line-demo.phone:06:",
            sense: "phone",
            context: "he stayed talking on the party <head>line</head> for almost an hour",
        },
        LabeledContext {
            id: "line-demo.phone:07:",
            sense: "phone",
            context: "static on the <head>line</head> made the conversation impossible",
        },
        LabeledContext {
            id: "line-demo.phone:08:",
            sense: "phone",
            context: "the operator said the <head>line</head> was busy and offered to call back later",
        },
        LabeledContext {
            id: "line-demo.phone:09:",
            sense: "phone",
            context: "a new fiber <head>line</head> connects the village exchange to the city",
        },
        LabeledContext {
            id: "line-demo.phone:10:",
            sense: "phone",
            context: "growth in access <head>line</head> revenue lifted the carrier results this quarter",
        },
        LabeledContext {
            id: "line-demo.phone:11:",
            sense: "phone",
            context: "callers jam the emergency <head>line</head> every single weekend",
        },
        LabeledContext {
            id: "line-demo.phone:12:",
            sense: "phone",
            context: "please stay on the <head>line</head> your call is important to us",
        },
        // ===== PRODUCT =====
        LabeledContext {
            id: "line-demo.product:01:",
            sense: "product",
            context: "the company launched a new <head>line</head> of winter clothing this fall",
        },
        LabeledContext {
            id: "line-demo.product:02:",
            sense: "product",
            context: "their premium product <head>line</head> sells well in department stores",
        },
        LabeledContext {
            id: "line-demo.product:03:",
            sense: "product",
            context: "the designer presented her spring <head>line</head> at the fashion show",
        },
        LabeledContext {
            id: "line-demo.product:04:",
            sense: "product",
            context: "retailers quietly dropped the aging <head>line</head> of kitchen appliances",
        },
        LabeledContext {
            id: "line-demo.product:05:",
            sense: "product",
            context: "the brand expanded its cosmetics <head>line</head> into asian markets",
        },
        LabeledContext {
            id: "line-demo.product:06:",
            sense: "product",
            context: "a discount <head>line</head> of sneakers hit the shelves last week",
        },
        LabeledContext {
            id: "line-demo.product:07:",
            sense: "product",
            context: "the automaker refreshed its entire <head>line</head> of compact cars",
        },
        LabeledContext {
            id: "line-demo.product:08:",
            sense: "product",
            context: "sales of the toy <head>line</head> doubled before the holidays",
        },
        LabeledContext {
            id: "line-demo.product:09:",
            sense: "product",
            context: "the new <head>line</head> of laptops features a much longer battery life",
        },
        LabeledContext {
            id: "line-demo.product:10:",
            sense: "product",
            context: "analysts praised the updated <head>line</head> of breakfast cereals",
        },
    ]
}

/// Materializa o corpus de demonstração como instâncias rotuladas.
pub fn demo_corpus() -> Vec<Instance> {
    demo_contexts()
        .iter()
        .map(|c| {
            // Os contextos embutidos são estáticos e sempre carregam <head>
            let (tokens, head_index) =
                tokenize_marked(c.context).expect("contexto de demonstração com cabeça");
            Instance {
                id: c.id.to_string(),
                tokens,
                head_index,
                sense: Some(c.sense.to_string()),
            }
        })
        .collect()
}

/// Textos de demonstração (sem marcação) para a interface web.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("phone", "I tried calling the office but the line was busy all morning."),
        ("phone", "After the storm the line went dead and nobody could reach us."),
        ("product", "The store is promoting a new line of summer dresses."),
        ("product", "Their budget line of headphones outsold every competitor."),
        ("phone", "Please stay on the line while we connect your call."),
        ("product", "The company retired its oldest line of printers this year."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<corpus lang="en">
<lexelt item="line-n">
<instance id="line-n.w8_059:8174:">
<answer instance="line-n.w8_059:8174:" senseid="phone"/>
<context>
 <s> the <head>line</head> went dead . </s>
</context>
</instance>
<instance id="line-n.w9_16:217:">
<answer instance="line-n.w9_16:217:" senseid="product"/>
<context>
 <p> <s> a new <head>line</head> of clothing <@> </s> </p>
</context>
</instance>
</lexelt>
</corpus>"#;

    #[test]
    fn test_clean_markup_strips_structural_tags() {
        let cleaned = clean_markup("<p> <s> hello <@> world </s> </p>");
        assert!(!cleaned.contains("<s>"));
        assert!(!cleaned.contains("<@>"));
        assert!(cleaned.contains("hello"));
    }

    #[test]
    fn test_parse_training_corpus() {
        let instances = parse_corpus(SAMPLE, CorpusKind::Training).unwrap();
        assert_eq!(instances.len(), 2);

        assert_eq!(instances[0].id, "line-n.w8_059:8174:");
        assert_eq!(instances[0].sense.as_deref(), Some("phone"));
        assert_eq!(instances[0].tokens[instances[0].head_index], "line");

        assert_eq!(instances[1].sense.as_deref(), Some("product"));
    }

    #[test]
    fn test_parse_test_corpus_ignores_labels() {
        let instances = parse_corpus(SAMPLE, CorpusKind::Test).unwrap();
        assert!(instances.iter().all(|i| i.sense.is_none()));
    }

    #[test]
    fn test_training_without_label_is_fatal() {
        let unlabeled = r#"<instance id="line-x:1:">
<context> the <head>line</head> rang </context>
</instance>"#;
        let err = parse_corpus(unlabeled, CorpusKind::Training).unwrap_err();
        assert!(matches!(err, WsdError::UnlabeledInstance { id } if id == "line-x:1:"));
    }

    #[test]
    fn test_instance_without_head_is_fatal() {
        let broken = r#"<instance id="line-x:2:">
<answer instance="line-x:2:" senseid="phone"/>
<context> no target here at all </context>
</instance>"#;
        let err = parse_corpus(broken, CorpusKind::Training).unwrap_err();
        assert!(matches!(err, WsdError::MalformedInstance { id } if id == "line-x:2:"));
    }

    #[test]
    fn test_instance_without_context_is_fatal() {
        let broken = r#"<instance id="line-x:3:">
<answer instance="line-x:3:" senseid="phone"/>
</instance>"#;
        assert!(parse_corpus(broken, CorpusKind::Training).is_err());
    }

    #[test]
    fn test_demo_corpus_is_well_formed() {
        let corpus = demo_corpus();
        assert!(corpus.len() > 20);
        for instance in &corpus {
            assert_eq!(instance.tokens[instance.head_index], "line");
            assert!(instance.sense.is_some());
        }
    }
}
