use serde::Serialize;

/// Quick-fill example offered next to the form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Preset {
    pub subject: &'static str,
    pub body: &'static str,
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        subject: "Pedido de cópia do aditivo contratual de aumento salarial (Ref. 2024).",
        body: "Olá RH, Preciso de uma cópia do meu aditivo contratual que formaliza o último aumento salarial (Referência 2024) para fins pessoais. Por favor, envie o documento. Obrigado.",
    },
    Preset {
        subject: "Confirmação de Inscrição: Programa de Mentoria 2025.",
        body: "Olá, Sua inscrição no Programa de Mentoria 2025 foi confirmada com sucesso.",
    },
    Preset {
        subject: "Pedido de cotação para serviço de manutenção de ar-condicionado (Anual).",
        body: "Olá Compras, Precisamos de uma cotação para o serviço de manutenção anual preventiva e corretiva de todos os aparelhos de ar-condicionado do escritório. Por favor, solicite 3 propostas. Obrigado.",
    },
    Preset {
        subject: "Agradecimento pelo elogio ao Atendimento.",
        body: "Olá Fulano, Recebemos seu feedback positivo sobre o atendimento do nosso suporte. Repassamos o elogio à equipe.",
    },
];
