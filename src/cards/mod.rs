//! Card catalog port: where black and white cards come from.
//!
//! Card content is seeded and stored by a separate service; the engine only
//! needs random draws that respect a room's no-reuse ledger. The trait keeps
//! that collaborator swappable, and [`InMemoryCatalog`] is the default
//! implementation for in-process play and tests.

use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::HashSet;

use crate::game::entities::{BlackCard, CardId, WhiteCard};

/// Source of card content for game rooms.
pub trait CardCatalog: Send + Sync {
    /// One random black card whose id is not in `exclude`, or `None` when
    /// the catalog is exhausted for this room.
    fn random_black(&self, exclude: &[CardId]) -> Option<BlackCard>;

    /// Up to `count` distinct random white cards, none of them in
    /// `exclude`. May return fewer than `count` when the catalog runs low.
    fn draw_whites(&self, count: usize, exclude: &[CardId]) -> Vec<WhiteCard>;

    /// Resolves ids to full cards, preserving the input order. Unknown ids
    /// are skipped.
    fn whites_by_ids(&self, ids: &[CardId]) -> Vec<WhiteCard>;
}

/// A fixed catalog held in memory.
pub struct InMemoryCatalog {
    black_cards: Vec<BlackCard>,
    white_cards: Vec<WhiteCard>,
}

impl InMemoryCatalog {
    pub fn new(black_cards: Vec<BlackCard>, white_cards: Vec<WhiteCard>) -> Self {
        Self {
            black_cards,
            white_cards,
        }
    }

    pub fn black_count(&self) -> usize {
        self.black_cards.len()
    }

    pub fn white_count(&self) -> usize {
        self.white_cards.len()
    }

    /// A small built-in deck, enough for a full game at any win score the
    /// engine accepts.
    pub fn sample() -> Self {
        let blacks = [
            ("O que me mantém acordado de noite é ___.", 1),
            ("___ é a nova tendência entre os jovens.", 1),
            ("O segredo para um casamento feliz é ___.", 1),
            ("Meu terapeuta disse que eu preciso parar com ___.", 1),
            ("___ é meu prazer secreto.", 1),
            ("A coisa mais estranha que já encontrei no metrô foi ___.", 1),
            ("___ é a razão pela qual fui demitido.", 1),
            ("O WiFi deveria se chamar ___.", 1),
            ("Minha desculpa favorita para faltar ao trabalho é ___.", 1),
            ("Quando morrer, quero ser lembrado por ___.", 1),
            ("No futuro, crianças vão estudar sobre ___ nas escolas.", 1),
            ("O brasileiro médio não consegue viver sem ___.", 1),
            ("Minha última pesquisa no Google foi: \"Como se livrar de ___\".", 1),
            ("O ingrediente secreto da minha receita de família é ___.", 1),
            ("Em 2050, os historiadores vão lembrar desta época por ___.", 1),
            ("Na minha família, Natal não é Natal sem ___.", 1),
            ("A única coisa pior que ___ é ___.", 2),
            ("O segredo da felicidade é substituir ___ por ___.", 2),
            ("Meu médico recomendou ___ para tratar ___.", 2),
            ("Acabei de criar um app que conecta ___ com ___.", 2),
        ];
        let whites = [
            "Comer feijoada às 3 da manhã",
            "O cheiro de coxinha",
            "Fingir que não está em casa quando a visita chega",
            "Mandar áudio de 5 minutos no WhatsApp",
            "Roubar WiFi do vizinho",
            "Chorar no banho",
            "Fingir orgasmo",
            "A dívida do cartão de crédito",
            "Assistir Netflix com a ex",
            "Um boleto vencido",
            "Pão de queijo infinito",
            "Dancinha de TikTok no velório",
            "Aquele primo que pede dinheiro emprestado",
            "Gritar com a impressora",
            "Cerveja quente",
            "Reunião que podia ser um e-mail",
            "Responder 'vou ver e te falo'",
            "O bafo de quem comeu pastel de alho",
            "Jogar o controle quando perde",
            "Falar 'oi, sumido'",
            "Chegar três horas atrasado",
            "Marmita de segunda-feira",
            "Dormir com o ventilador na potência máxima",
            "Pedir música no Fantástico",
            "Passar o rodo",
            "Dividir a conta no palitinho",
            "Aquela planilha de gastos abandonada",
            "Chorar ouvindo sertanejo",
            "Print da conversa errada no grupo errado",
            "Fila do SUS",
            "Esquecer o nome da pessoa na hora do oi",
            "Wi-Fi do aeroporto",
            "Procrastinar olhando vídeo de capivara",
            "Stalkear o crush até 2014",
            "O churrasco que virou reunião de condomínio",
            "Feriado que cai no domingo",
            "A gaveta de tralhas da cozinha",
            "Comprar curso e nunca assistir",
            "Elogiar a própria comida",
            "Sair do grupo da família",
            "Pedir 'só um gole' e virar o copo",
            "Acordar cinco minutos antes da reunião",
            "Guardanapo de padaria",
            "Dizer que vai dormir cedo",
            "Aplaudir o pouso do avião",
            "Trocar a senha e esquecer na hora",
            "Ler as mensagens e não responder",
            "Levar tupperware da mãe e nunca devolver",
            "Ficar rico em aplicativo de fazenda",
            "Abrir a geladeira esperando comida nova",
            "O estagiário que derruba o sistema",
            "Pagar academia e não ir",
            "Conversar com o gato como se fosse gente",
            "Aquele amigo que só aparece quando termina o namoro",
            "Defender time que só perde",
            "Fingir que entendeu a explicação",
        ];

        let black_cards = blacks
            .iter()
            .enumerate()
            .map(|(i, (text, pick))| BlackCard {
                id: format!("b{}", i + 1),
                text: (*text).to_string(),
                pick: *pick,
            })
            .collect();
        let white_cards = whites
            .iter()
            .enumerate()
            .map(|(i, text)| WhiteCard {
                id: format!("w{}", i + 1),
                text: (*text).to_string(),
            })
            .collect();

        Self::new(black_cards, white_cards)
    }
}

impl CardCatalog for InMemoryCatalog {
    fn random_black(&self, exclude: &[CardId]) -> Option<BlackCard> {
        let exclude: HashSet<&CardId> = exclude.iter().collect();
        let available: Vec<&BlackCard> = self
            .black_cards
            .iter()
            .filter(|c| !exclude.contains(&c.id))
            .collect();
        let mut rng = rand::rng();
        available.choose(&mut rng).map(|c| (*c).clone())
    }

    fn draw_whites(&self, count: usize, exclude: &[CardId]) -> Vec<WhiteCard> {
        let exclude: HashSet<&CardId> = exclude.iter().collect();
        let mut available: Vec<&WhiteCard> = self
            .white_cards
            .iter()
            .filter(|c| !exclude.contains(&c.id))
            .collect();
        let mut rng = rand::rng();
        available.shuffle(&mut rng);
        available.into_iter().take(count).cloned().collect()
    }

    fn whites_by_ids(&self, ids: &[CardId]) -> Vec<WhiteCard> {
        ids.iter()
            .filter_map(|id| self.white_cards.iter().find(|c| &c.id == id).cloned())
            .collect()
    }
}
