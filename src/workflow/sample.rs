pub const SAMPLE_NOTES: &str = "The Renaissance was a period of cultural, artistic, political, and economic rebirth following the Middle Ages. It began in Italy in the 14th century and spread throughout Europe. Key characteristics include:

- Humanism: Focus on human potential and achievements
- Art: Realistic techniques, perspective, and classical themes
- Science: Empirical observation and scientific method
- Literature: Vernacular languages, individual expression
- Politics: Rise of city-states and centralized monarchies

Notable figures include Leonardo da Vinci (artist/inventor), Michelangelo (sculptor/painter), William Shakespeare (playwright), and Galileo Galilei (astronomer). The printing press, invented by Gutenberg around 1440, helped spread Renaissance ideas rapidly across Europe.

The Renaissance marked the transition from medieval to modern times, emphasizing reason, individualism, and the rediscovery of classical Greek and Roman texts.";
